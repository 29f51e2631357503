use serde::{Deserialize, Serialize};

use crate::enums::JobType;

/// A stored pipeline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  /// Unique workflow name.
  pub name: String,
  /// Owning project.
  #[serde(default)]
  pub project: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub stages: Vec<Stage>,
}

impl Workflow {
  /// Every job of the workflow, in stage order then job order.
  pub fn jobs(&self) -> impl Iterator<Item = &Job> {
    self.stages.iter().flat_map(|stage| stage.jobs.iter())
  }

  /// Get the first job with the given name.
  pub fn get_job(&self, job_name: &str) -> Option<&Job> {
    self.jobs().find(|job| job.name == job_name)
  }
}

/// An ordered group of jobs. Stages run one after another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
  pub name: String,
  #[serde(default)]
  pub parallel: bool,
  #[serde(default)]
  pub jobs: Vec<Job>,
}

/// One step of a pipeline.
///
/// The spec payload is kept untyped; its shape depends on `job_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
  /// Job name, unique within its workflow.
  pub name: String,
  #[serde(rename = "type")]
  pub job_type: JobType,
  #[serde(default)]
  pub spec: serde_json::Value,
}
