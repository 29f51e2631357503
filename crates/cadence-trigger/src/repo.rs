use cadence_config::{DecodeMode, JobSpec, JobType, Param, Repo, Workflow};
use tracing::debug;

/// Substitutes repository parameters that point at a build job's repository.
///
/// Resolution is best effort: a parameter whose job, service or repository
/// index cannot be found is left as it is and no error is raised.
pub struct RepoParamResolver<'a> {
  workflow: &'a Workflow,
}

impl<'a> RepoParamResolver<'a> {
  pub fn new(workflow: &'a Workflow) -> Self {
    Self { workflow }
  }

  /// Replace `param.repo` with the referenced build repository, if any.
  pub fn resolve(&self, param: &mut Param) {
    if !param.is_repo() {
      return;
    }
    let Some(repo) = &param.repo else {
      return;
    };
    if !repo.is_from_job() {
      return;
    }

    let Some(found) = self.find_job_repo(repo) else {
      debug!(
        workflow = %self.workflow.name,
        param = %param.name,
        job = %repo.job_name,
        index = repo.job_repo_index,
        "repo param left unresolved"
      );
      return;
    };
    param.repo = Some(found);
  }

  fn find_job_repo(&self, repo: &Repo) -> Option<Repo> {
    let build_jobs = self
      .workflow
      .jobs()
      .filter(|job| job.name == repo.job_name && job.job_type == JobType::Build);

    for job in build_jobs {
      let Ok(JobSpec::Build(spec)) = job.decode_spec(DecodeMode::Strict) else {
        continue;
      };
      let entries = spec.service_and_builds.iter().filter(|build| {
        build.service_name == repo.service_name && build.service_module == repo.service_module
      });
      for build in entries {
        if let Some(found) = build.repos.get(repo.job_repo_index) {
          return Some(found.clone());
        }
      }
    }
    None
  }
}
