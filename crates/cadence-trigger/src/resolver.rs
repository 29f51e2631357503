use std::collections::HashMap;

use cadence_config::{
  DecodeMode, JobType, ServiceIdentity, ServiceTriggerWorkflowInfo, TriggerJobSpec, TriggerSource,
  TriggerType, Workflow,
};
use tracing::debug;

use crate::error::TriggerError;
use crate::repo::RepoParamResolver;
use crate::task::{TaskDescriptor, TriggerEvent, TriggerTaskSpec};

/// Workflow to start per service. Later entries replace earlier ones for the
/// same service.
type ServiceTargets<'s> = HashMap<ServiceIdentity, &'s ServiceTriggerWorkflowInfo>;

/// Turns a trigger job's spec into the workflow starts it produces.
pub struct TriggerResolver<'a> {
  workflow: &'a Workflow,
}

impl<'a> TriggerResolver<'a> {
  /// Create a resolver for trigger jobs of `workflow`.
  pub fn new(workflow: &'a Workflow) -> Self {
    Self { workflow }
  }

  /// Resolve the ordered list of trigger events for `spec`.
  ///
  /// Every event carries the owning workflow's project, and repo parameters
  /// that reference a build job of the owning workflow are substituted.
  pub fn resolve(&self, spec: &TriggerJobSpec) -> Result<Vec<TriggerEvent>, TriggerError> {
    let mut events = match &spec.trigger_type {
      TriggerType::Fixed => spec
        .fixed_workflow_list
        .iter()
        .map(|fixed| TriggerEvent::new(&fixed.workflow_name, None, &fixed.params))
        .collect(),
      TriggerType::Common => {
        let targets = service_targets(spec);
        match &spec.source {
          Some(TriggerSource::Runtime) => runtime_events(spec, &targets)?,
          Some(TriggerSource::FromJob) => self.source_job_events(&spec.source_job_name, &targets)?,
          _ => return Err(unsupported(spec)),
        }
      }
      TriggerType::Other(_) => return Err(unsupported(spec)),
    };

    let repos = RepoParamResolver::new(self.workflow);
    for event in &mut events {
      event.project_name = self.workflow.project.clone();
      for param in &mut event.params {
        repos.resolve(param);
      }
    }

    debug!(
      workflow = %self.workflow.name,
      trigger_type = %spec.trigger_type,
      events = events.len(),
      "resolved trigger events"
    );
    Ok(events)
  }

  /// Resolve `spec` and wrap the events into the task for `job_name`.
  pub fn task(&self, job_name: &str, spec: &TriggerJobSpec) -> Result<TaskDescriptor, TriggerError> {
    let events = self.resolve(spec)?;
    Ok(TaskDescriptor::workflow_trigger(
      job_name,
      TriggerTaskSpec {
        trigger_type: spec.trigger_type.clone(),
        is_enable_check: spec.is_enable_check,
        workflow_trigger_events: events,
      },
    ))
  }

  /// Events for the services handled by the first job named `job_name`.
  ///
  /// Services without a configured workflow are skipped.
  fn source_job_events(
    &self,
    job_name: &str,
    targets: &ServiceTargets<'_>,
  ) -> Result<Vec<TriggerEvent>, TriggerError> {
    let not_found = || TriggerError::SourceJobNotFound {
      job_name: job_name.to_string(),
    };

    let job = self.workflow.get_job(job_name).ok_or_else(not_found)?;
    let services = match job.job_type {
      JobType::Build | JobType::DistributeImage | JobType::Deploy => job
        .decode_spec(DecodeMode::Strict)
        .map_err(|e| TriggerError::decode(&job.name, e))?
        .service_identities(),
      _ => None,
    };
    let services = services.ok_or_else(not_found)?;

    Ok(
      services
        .into_iter()
        .filter_map(|service| {
          let info = targets.get(&service)?;
          Some(TriggerEvent::new(
            &info.workflow_name,
            Some(service),
            &info.params,
          ))
        })
        .collect(),
    )
  }
}

fn service_targets(spec: &TriggerJobSpec) -> ServiceTargets<'_> {
  let mut targets = HashMap::new();
  for info in &spec.service_trigger_workflow {
    targets.insert(info.identity(), info);
  }
  targets
}

/// Every run-time service must have a configured workflow.
fn runtime_events(
  spec: &TriggerJobSpec,
  targets: &ServiceTargets<'_>,
) -> Result<Vec<TriggerEvent>, TriggerError> {
  spec
    .source_service
    .iter()
    .map(|service| -> Result<TriggerEvent, TriggerError> {
      let info = targets
        .get(service)
        .ok_or_else(|| TriggerError::MissingTriggerInfo {
          service: service.service_name.clone(),
          module: service.service_module.clone(),
        })?;
      Ok(TriggerEvent::new(
        &info.workflow_name,
        Some(service.clone()),
        &info.params,
      ))
    })
    .collect()
}

fn unsupported(spec: &TriggerJobSpec) -> TriggerError {
  TriggerError::UnsupportedTriggerConfiguration {
    trigger_type: spec.trigger_type.to_string(),
    trigger_source: spec
      .source
      .as_ref()
      .map(|source| source.to_string())
      .unwrap_or_default(),
  }
}
