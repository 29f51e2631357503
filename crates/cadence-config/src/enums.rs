use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a pipeline job. Decides the shape of the job's spec payload.
///
/// Kinds this crate has no special handling for are kept verbatim in
/// [`JobType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
  Build,
  Deploy,
  DistributeImage,
  WorkflowTrigger,
  Freestyle,
  Plugin,
  Testing,
  Scanning,
  Approval,
  #[serde(untagged)]
  Other(String),
}

impl JobType {
  pub fn as_str(&self) -> &str {
    match self {
      JobType::Build => "build",
      JobType::Deploy => "deploy",
      JobType::DistributeImage => "distribute_image",
      JobType::WorkflowTrigger => "workflow_trigger",
      JobType::Freestyle => "freestyle",
      JobType::Plugin => "plugin",
      JobType::Testing => "testing",
      JobType::Scanning => "scanning",
      JobType::Approval => "approval",
      JobType::Other(kind) => kind,
    }
  }

  /// Whether a job of this kind may live in a workflow that is started by a
  /// trigger job.
  pub fn is_triggerable(&self) -> bool {
    matches!(
      self,
      JobType::Freestyle | JobType::Plugin | JobType::WorkflowTrigger
    )
  }
}

impl fmt::Display for JobType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How a trigger job picks the workflows it starts.
///
/// Unrecognized values are kept verbatim so they can be reported instead of
/// failing the decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
  /// Targets are chosen per service from `service_trigger_workflow`.
  Common,
  /// Every entry of `fixed_workflow_list` is started.
  Fixed,
  #[serde(untagged)]
  Other(String),
}

impl fmt::Display for TriggerType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TriggerType::Common => f.write_str("common"),
      TriggerType::Fixed => f.write_str("fixed"),
      TriggerType::Other(value) => f.write_str(value),
    }
  }
}

/// Where a `common` trigger job takes its list of services from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
  /// Services are chosen when the workflow is started.
  Runtime,
  /// Services are those handled by an earlier job of the same workflow.
  FromJob,
  #[serde(untagged)]
  Other(String),
}

impl fmt::Display for TriggerSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TriggerSource::Runtime => f.write_str("runtime"),
      TriggerSource::FromJob => f.write_str("from_job"),
      TriggerSource::Other(value) => f.write_str(value),
    }
  }
}

/// Where a repository parameter gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoSource {
  Runtime,
  Param,
  /// Copied from a repository of a build job in the same workflow.
  FromJob,
}
