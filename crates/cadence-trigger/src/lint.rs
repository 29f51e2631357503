use cadence_config::{JobType, Workflow};
use cadence_store::WorkflowLookup;
use tracing::info;

use crate::error::TriggerError;
use crate::job::WorkflowTriggerJob;

/// Lint every trigger job of `workflow`, in stage then job order.
///
/// Stops at the first failing job. Returns how many trigger jobs were linted.
pub async fn lint_workflow<L: WorkflowLookup + ?Sized>(
  workflow: &Workflow,
  lookup: &L,
) -> Result<usize, TriggerError> {
  let mut linted = 0;
  for job in workflow.jobs() {
    if job.job_type != JobType::WorkflowTrigger {
      continue;
    }
    WorkflowTriggerJob::new(job.clone(), workflow)
      .lint_job(lookup)
      .await?;
    linted += 1;
  }

  info!(workflow = %workflow.name, trigger_jobs = linted, "workflow lint passed");
  Ok(linted)
}
