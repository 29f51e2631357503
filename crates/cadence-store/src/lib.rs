//! Cadence Store
//!
//! This crate provides read access to stored workflow definitions.
//!
//! The [`WorkflowLookup`] trait is the only capability the trigger validators
//! need: fetch a full workflow by its unique name. Two implementations ship
//! with the crate:
//! - [`MemoryWorkflowStore`], a map held in memory (tests, embedding)
//! - [`FsWorkflowStore`], one JSON or YAML file per workflow in a directory

mod fs;
mod memory;

pub use fs::FsWorkflowStore;
pub use memory::MemoryWorkflowStore;

use async_trait::async_trait;
use cadence_config::Workflow;

/// Error type for workflow lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
  /// No workflow with this name exists.
  #[error("workflow not found: {0}")]
  NotFound(String),

  /// A stored definition declares a different name than it is stored under.
  #[error("workflow {requested} declares the name {declared}")]
  NameMismatch { requested: String, declared: String },

  /// IO error when reading workflow files.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A stored JSON definition could not be parsed.
  #[error("invalid workflow definition: {0}")]
  InvalidJson(#[from] serde_json::Error),

  /// A stored YAML definition could not be parsed.
  #[error("invalid workflow definition: {0}")]
  InvalidYaml(#[from] serde_yaml::Error),
}

/// Read-only access to workflow definitions by name.
#[async_trait]
pub trait WorkflowLookup: Send + Sync {
  /// Fetch the workflow with the given name.
  ///
  /// Returns [`LookupError::NotFound`] when it does not exist.
  async fn find_workflow(&self, name: &str) -> Result<Workflow, LookupError>;
}

