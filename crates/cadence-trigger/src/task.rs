use cadence_config::{JobType, Param, ServiceIdentity, TriggerType};
use serde::{Deserialize, Serialize};

/// One downstream workflow start produced by a trigger job.
///
/// Built fresh on every resolution and never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
  pub workflow_name: String,
  /// Always the triggering workflow's project.
  pub project_name: String,
  /// The service that selected this workflow, for `common` triggers.
  #[serde(flatten)]
  pub service: Option<ServiceIdentity>,
  pub params: Vec<Param>,
}

impl TriggerEvent {
  pub(crate) fn new(
    workflow_name: &str,
    service: Option<ServiceIdentity>,
    params: &[Param],
  ) -> Self {
    Self {
      workflow_name: workflow_name.to_string(),
      project_name: String::new(),
      service,
      params: params.to_vec(),
    }
  }
}

/// The unit handed to the task execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
  pub name: String,
  pub key: String,
  pub job_type: JobType,
  pub spec: TriggerTaskSpec,
  /// Seconds; zero means no timeout.
  pub timeout: u64,
}

impl TaskDescriptor {
  /// Build the task for a trigger job. Trigger tasks never time out.
  pub fn workflow_trigger(job_name: &str, spec: TriggerTaskSpec) -> Self {
    Self {
      name: job_name.to_string(),
      key: job_name.to_string(),
      job_type: JobType::WorkflowTrigger,
      spec,
      timeout: 0,
    }
  }
}

/// Task spec of a `workflow_trigger` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerTaskSpec {
  pub trigger_type: TriggerType,
  pub is_enable_check: bool,
  pub workflow_trigger_events: Vec<TriggerEvent>,
}
