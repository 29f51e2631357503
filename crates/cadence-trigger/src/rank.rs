use std::collections::HashMap;

use cadence_config::Workflow;

use crate::error::TriggerError;

/// Position of every job in the workflow: stage order, then job order.
///
/// Ranks are strictly increasing, so jobs of the same stage are ordered too.
/// If a name repeats, its first occurrence counts.
pub fn job_ranks(workflow: &Workflow) -> HashMap<&str, usize> {
  let mut ranks = HashMap::new();
  for (rank, job) in workflow.jobs().enumerate() {
    ranks.entry(job.name.as_str()).or_insert(rank);
  }
  ranks
}

/// Require `source_job` to run before `trigger_job` in `workflow`.
pub fn validate_ordering(
  workflow: &Workflow,
  source_job: &str,
  trigger_job: &str,
) -> Result<(), TriggerError> {
  let ranks = job_ranks(workflow);
  match (ranks.get(source_job), ranks.get(trigger_job)) {
    (Some(source), Some(trigger)) if source < trigger => Ok(()),
    _ => Err(TriggerError::InvalidOrdering {
      source_job: source_job.to_string(),
      trigger_job: trigger_job.to_string(),
    }),
  }
}
