use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use cadence_config::{DecodeMode, JobType, TriggerJobSpec, Workflow, decode};
use cadence_store::WorkflowLookup;
use tracing::{debug, instrument};

use crate::error::TriggerError;
use crate::rank::validate_ordering;

type CheckFuture<'b> = Pin<Box<dyn Future<Output = Result<(), TriggerError>> + Send + 'b>>;

/// Walks the graph of workflows reachable through trigger jobs and rejects
/// graphs that loop back onto the current trigger path, or that reach
/// workflows with job kinds which cannot be triggered.
///
/// Loops are detected per path: a workflow reached through two unrelated
/// branches is not a loop. Each visit only deduplicates the targets it has
/// already checked itself.
pub struct CycleValidator<'a, L: WorkflowLookup + ?Sized> {
  lookup: &'a L,
}

impl<'a, L: WorkflowLookup + ?Sized> CycleValidator<'a, L> {
  /// Create a validator fetching workflows from `lookup`.
  pub fn new(lookup: &'a L) -> Self {
    Self { lookup }
  }

  /// Validate the trigger job `trigger_job` of `workflow`, whose spec is `spec`.
  ///
  /// Also checks that a `from_job` source runs before the trigger job.
  #[instrument(skip_all, fields(workflow = %workflow.name, job = %trigger_job))]
  pub async fn validate(
    &self,
    spec: &TriggerJobSpec,
    workflow: &Workflow,
    trigger_job: &str,
  ) -> Result<(), TriggerError> {
    let path = HashSet::from([workflow.name.clone()]);
    let mut checked = HashSet::new();
    self.check_targets(spec, workflow, &path, &mut checked).await?;

    if spec.is_from_job() {
      validate_ordering(workflow, &spec.source_job_name, trigger_job)?;
    }

    debug!("trigger graph is valid");
    Ok(())
  }

  /// Check every per-service target of `spec`, then everything those start.
  ///
  /// Workflows are tracked by the name they are referenced with. `path` holds
  /// the workflows on the current trigger path, `owner` included.
  /// `checked` is shared by all trigger jobs of `owner`.
  fn check_targets<'b>(
    &'b self,
    spec: &'b TriggerJobSpec,
    owner: &'b Workflow,
    path: &'b HashSet<String>,
    checked: &'b mut HashSet<String>,
  ) -> CheckFuture<'b> {
    Box::pin(async move {
      for name in spec.service_workflow_names() {
        if checked.contains(name) {
          continue;
        }

        let target = self
          .lookup
          .find_workflow(name)
          .await
          .map_err(|e| TriggerError::lookup(name, e))?;

        if path.contains(name) {
          return Err(TriggerError::CycleDetected {
            workflow: owner.name.clone(),
          });
        }
        checked.insert(name.to_string());
        debug!(owner = %owner.name, target = %name, depth = path.len(), "checking triggered workflow");

        let mut extended = path.clone();
        extended.insert(name.to_string());
        let mut target_checked = HashSet::new();
        for job in target.jobs() {
          if job.job_type != JobType::WorkflowTrigger {
            continue;
          }
          let nested: TriggerJobSpec =
            decode(&job.spec, DecodeMode::Strict).map_err(|e| TriggerError::decode(&job.name, e))?;
          self
            .check_targets(&nested, &target, &extended, &mut target_checked)
            .await?;
        }

        ensure_triggerable(&target)?;
      }
      Ok(())
    })
  }
}

/// A triggered workflow may only contain freestyle, plugin and trigger jobs.
fn ensure_triggerable(workflow: &Workflow) -> Result<(), TriggerError> {
  match workflow.jobs().find(|job| !job.job_type.is_triggerable()) {
    Some(job) => Err(TriggerError::UnsupportedJobType {
      workflow: workflow.name.clone(),
      job: job.name.clone(),
    }),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cadence_config::{FixedWorkflow, Job, ServiceTriggerWorkflowInfo, Stage, TriggerSource, TriggerType};
  use cadence_store::{LookupError, MemoryWorkflowStore};
  use serde_json::json;

  fn trigger_spec(targets: &[&str]) -> TriggerJobSpec {
    TriggerJobSpec {
      trigger_type: TriggerType::Common,
      source: Some(TriggerSource::Runtime),
      source_job_name: String::new(),
      source_service: vec![],
      service_trigger_workflow: targets
        .iter()
        .enumerate()
        .map(|(i, target)| ServiceTriggerWorkflowInfo {
          service_name: format!("svc-{}", i),
          service_module: "main".to_string(),
          workflow_name: target.to_string(),
          params: vec![],
        })
        .collect(),
      fixed_workflow_list: vec![],
      is_enable_check: false,
    }
  }

  fn trigger_job(name: &str, targets: &[&str]) -> Job {
    Job {
      name: name.to_string(),
      job_type: JobType::WorkflowTrigger,
      spec: serde_json::to_value(trigger_spec(targets)).unwrap(),
    }
  }

  fn plain_job(name: &str, job_type: JobType) -> Job {
    Job {
      name: name.to_string(),
      job_type,
      spec: json!({}),
    }
  }

  fn workflow(name: &str, jobs: Vec<Job>) -> Workflow {
    Workflow {
      name: name.to_string(),
      project: "shop".to_string(),
      description: None,
      stages: vec![Stage {
        name: "main".to_string(),
        parallel: false,
        jobs,
      }],
    }
  }

  /// `name` holds a script job plus a trigger job starting `targets`.
  fn triggering(name: &str, targets: &[&str]) -> Workflow {
    workflow(
      name,
      vec![
        plain_job("script", JobType::Freestyle),
        trigger_job("trigger", targets),
      ],
    )
  }

  fn leaf(name: &str) -> Workflow {
    workflow(name, vec![plain_job("script", JobType::Freestyle)])
  }

  async fn validate_root(store: &MemoryWorkflowStore, root: &str) -> Result<(), TriggerError> {
    let workflow = store.find_workflow(root).await.unwrap();
    let job = workflow.get_job("trigger").unwrap();
    let spec: TriggerJobSpec = decode(&job.spec, DecodeMode::Strict).unwrap();
    CycleValidator::new(store)
      .validate(&spec, &workflow, "trigger")
      .await
  }

  #[tokio::test]
  async fn test_chain_without_back_edge_is_valid() {
    let store: MemoryWorkflowStore = [triggering("a", &["b"]), triggering("b", &["c"]), leaf("c")]
      .into_iter()
      .collect();

    assert!(validate_root(&store, "a").await.is_ok());
  }

  #[tokio::test]
  async fn test_two_workflow_loop_is_detected() {
    let store: MemoryWorkflowStore = [triggering("a", &["b"]), triggering("b", &["a"])]
      .into_iter()
      .collect();

    let result = validate_root(&store, "a").await;
    assert!(matches!(result, Err(TriggerError::CycleDetected { workflow }) if workflow == "b"));
  }

  #[tokio::test]
  async fn test_self_trigger_is_detected() {
    let store: MemoryWorkflowStore = [triggering("a", &["a"])].into_iter().collect();

    let result = validate_root(&store, "a").await;
    assert!(matches!(result, Err(TriggerError::CycleDetected { workflow }) if workflow == "a"));
  }

  #[tokio::test]
  async fn test_deep_loop_is_detected() {
    let store: MemoryWorkflowStore = [
      triggering("a", &["b"]),
      triggering("b", &["c"]),
      triggering("c", &["b"]),
    ]
    .into_iter()
    .collect();

    let result = validate_root(&store, "a").await;
    assert!(matches!(result, Err(TriggerError::CycleDetected { workflow }) if workflow == "c"));
  }

  #[tokio::test]
  async fn test_diamond_is_valid() {
    let store: MemoryWorkflowStore = [
      triggering("a", &["b", "c"]),
      triggering("b", &["d"]),
      triggering("c", &["d"]),
      leaf("d"),
    ]
    .into_iter()
    .collect();

    assert!(validate_root(&store, "a").await.is_ok());
  }

  #[tokio::test]
  async fn test_unknown_workflow_fails() {
    let store: MemoryWorkflowStore = [triggering("a", &["b"]), triggering("b", &["ghost"])]
      .into_iter()
      .collect();

    let result = validate_root(&store, "a").await;
    assert!(matches!(result, Err(TriggerError::UnknownWorkflow { name }) if name == "ghost"));
  }

  #[tokio::test]
  async fn test_build_job_in_triggered_workflow_is_rejected() {
    let store: MemoryWorkflowStore = [
      triggering("a", &["b"]),
      workflow(
        "b",
        vec![
          plain_job("script", JobType::Freestyle),
          plain_job("compile", JobType::Build),
        ],
      ),
    ]
    .into_iter()
    .collect();

    let result = validate_root(&store, "a").await;
    assert!(matches!(
      result,
      Err(TriggerError::UnsupportedJobType { workflow, job }) if workflow == "b" && job == "compile"
    ));
  }

  #[tokio::test]
  async fn test_nested_target_job_types_are_checked() {
    let store: MemoryWorkflowStore = [
      triggering("a", &["b"]),
      triggering("b", &["c"]),
      workflow("c", vec![plain_job("deploy", JobType::Deploy)]),
    ]
    .into_iter()
    .collect();

    let result = validate_root(&store, "a").await;
    assert!(matches!(
      result,
      Err(TriggerError::UnsupportedJobType { workflow, .. }) if workflow == "c"
    ));
  }

  #[tokio::test]
  async fn test_fixed_targets_are_not_walked() {
    let mut fixed = trigger_spec(&[]);
    fixed.trigger_type = TriggerType::Fixed;
    fixed.source = None;
    fixed.fixed_workflow_list = vec![FixedWorkflow {
      workflow_name: "a".to_string(),
      params: vec![],
    }];
    let b = workflow(
      "b",
      vec![Job {
        name: "trigger".to_string(),
        job_type: JobType::WorkflowTrigger,
        spec: serde_json::to_value(&fixed).unwrap(),
      }],
    );
    let store: MemoryWorkflowStore = [triggering("a", &["b"]), b].into_iter().collect();

    assert!(validate_root(&store, "a").await.is_ok());
  }

  #[tokio::test]
  async fn test_fixed_trigger_job_skips_target_checks() {
    let mut fixed = trigger_spec(&[]);
    fixed.trigger_type = TriggerType::Fixed;
    fixed.source = None;
    fixed.fixed_workflow_list = vec![FixedWorkflow {
      workflow_name: "b".to_string(),
      params: vec![],
    }];
    let store: MemoryWorkflowStore = [workflow("b", vec![plain_job("compile", JobType::Build)])]
      .into_iter()
      .collect();

    let owner = leaf("a");
    let result = CycleValidator::new(&store)
      .validate(&fixed, &owner, "trigger")
      .await;
    assert!(result.is_ok());
  }

  #[tokio::test]
  async fn test_unknown_job_kind_in_triggered_workflow_is_rejected() {
    let store: MemoryWorkflowStore = [
      triggering("a", &["b"]),
      workflow(
        "b",
        vec![plain_job("rollout", JobType::Other("k8s_blue_green".to_string()))],
      ),
    ]
    .into_iter()
    .collect();

    let result = validate_root(&store, "a").await;
    assert!(matches!(
      result,
      Err(TriggerError::UnsupportedJobType { workflow, job }) if workflow == "b" && job == "rollout"
    ));
  }

  #[tokio::test]
  async fn test_store_failure_is_reported_as_lookup_error() {
    struct BrokenStore;

    #[async_trait::async_trait]
    impl WorkflowLookup for BrokenStore {
      async fn find_workflow(&self, _name: &str) -> Result<Workflow, LookupError> {
        Err(LookupError::Io(std::io::Error::new(
          std::io::ErrorKind::PermissionDenied,
          "permission denied",
        )))
      }
    }

    let owner = leaf("a");
    let result = CycleValidator::new(&BrokenStore)
      .validate(&trigger_spec(&["b"]), &owner, "trigger")
      .await;
    assert!(matches!(
      result,
      Err(TriggerError::Lookup { name, source: LookupError::Io(_) }) if name == "b"
    ));
  }

  #[tokio::test]
  async fn test_from_job_source_must_precede_trigger() {
    let mut spec = trigger_spec(&["b"]);
    spec.source = Some(TriggerSource::FromJob);
    spec.source_job_name = "compile".to_string();
    let store: MemoryWorkflowStore = [leaf("b")].into_iter().collect();

    let ordered = workflow(
      "a",
      vec![
        plain_job("compile", JobType::Build),
        trigger_job("trigger", &["b"]),
      ],
    );
    let validator = CycleValidator::new(&store);
    assert!(validator.validate(&spec, &ordered, "trigger").await.is_ok());

    let reversed = workflow(
      "a",
      vec![
        trigger_job("trigger", &["b"]),
        plain_job("compile", JobType::Build),
      ],
    );
    let result = validator.validate(&spec, &reversed, "trigger").await;
    assert!(matches!(
      result,
      Err(TriggerError::InvalidOrdering { source_job, trigger_job })
        if source_job == "compile" && trigger_job == "trigger"
    ));
  }
}
