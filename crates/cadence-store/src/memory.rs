use std::collections::HashMap;

use async_trait::async_trait;
use cadence_config::Workflow;

use crate::{LookupError, WorkflowLookup};

/// Workflow store backed by a map held in memory.
///
/// Each lookup returns an independent clone of the stored definition.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkflowStore {
  workflows: HashMap<String, Workflow>,
}

impl MemoryWorkflowStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add or replace a workflow, keyed by its name.
  pub fn insert(&mut self, workflow: Workflow) {
    self.workflows.insert(workflow.name.clone(), workflow);
  }

  pub fn with_workflow(mut self, workflow: Workflow) -> Self {
    self.insert(workflow);
    self
  }

  pub fn len(&self) -> usize {
    self.workflows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.workflows.is_empty()
  }
}

impl FromIterator<Workflow> for MemoryWorkflowStore {
  fn from_iter<I: IntoIterator<Item = Workflow>>(iter: I) -> Self {
    let mut store = Self::new();
    for workflow in iter {
      store.insert(workflow);
    }
    store
  }
}

#[async_trait]
impl WorkflowLookup for MemoryWorkflowStore {
  async fn find_workflow(&self, name: &str) -> Result<Workflow, LookupError> {
    self
      .workflows
      .get(name)
      .cloned()
      .ok_or_else(|| LookupError::NotFound(name.to_string()))
  }
}
