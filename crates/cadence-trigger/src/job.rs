use cadence_config::{DecodeMode, Job, TriggerJobSpec, Workflow, decode};
use cadence_store::WorkflowLookup;
use serde_json::Value;
use tracing::info;

use crate::cycle::CycleValidator;
use crate::error::TriggerError;
use crate::resolver::TriggerResolver;
use crate::task::TaskDescriptor;

/// A `workflow_trigger` job of a workflow, driven through its lifecycle.
///
/// Every step decodes the job's spec payload and stores the normalized form
/// back into the job, so later steps can use the strict decode.
pub struct WorkflowTriggerJob<'a> {
  job: Job,
  workflow: &'a Workflow,
  spec: Option<TriggerJobSpec>,
}

impl<'a> WorkflowTriggerJob<'a> {
  /// Wrap `job`, which belongs to `workflow`.
  pub fn new(job: Job, workflow: &'a Workflow) -> Self {
    Self {
      job,
      workflow,
      spec: None,
    }
  }

  pub fn job(&self) -> &Job {
    &self.job
  }

  /// The last decoded spec, if any step ran yet.
  pub fn spec(&self) -> Option<&TriggerJobSpec> {
    self.spec.as_ref()
  }

  pub fn into_job(self) -> Job {
    self.job
  }

  /// Materialize the job's configuration for the first time.
  pub fn instantiate(&mut self) -> Result<(), TriggerError> {
    let payload = self.job.spec.clone();
    self.load(&payload, DecodeMode::Yaml)?;
    Ok(())
  }

  /// Normalize an already materialized configuration.
  pub fn set_preset(&mut self) -> Result<(), TriggerError> {
    let payload = self.job.spec.clone();
    self.load(&payload, DecodeMode::Strict)?;
    Ok(())
  }

  /// Replace the configuration with the one given for this job at run time.
  pub fn merge_args(&mut self, args: &Job) -> Result<(), TriggerError> {
    self.load(&args.spec, DecodeMode::Strict)?;
    Ok(())
  }

  /// Produce the task for this job: a single trigger task.
  pub fn to_jobs(&mut self, task_id: i64) -> Result<Vec<TaskDescriptor>, TriggerError> {
    let payload = self.job.spec.clone();
    let spec = self.load(&payload, DecodeMode::Strict)?.clone();

    let task = TriggerResolver::new(self.workflow).task(&self.job.name, &spec)?;
    info!(
      task_id,
      workflow = %self.workflow.name,
      job = %self.job.name,
      events = task.spec.workflow_trigger_events.len(),
      "built workflow trigger task"
    );
    Ok(vec![task])
  }

  /// Check that the workflows this job starts cannot loop back and only
  /// contain triggerable jobs.
  pub async fn lint_job<L: WorkflowLookup + ?Sized>(&mut self, lookup: &L) -> Result<(), TriggerError> {
    let payload = self.job.spec.clone();
    let spec = self.load(&payload, DecodeMode::Yaml)?.clone();

    CycleValidator::new(lookup)
      .validate(&spec, self.workflow, &self.job.name)
      .await
  }

  fn load(&mut self, payload: &Value, mode: DecodeMode) -> Result<&TriggerJobSpec, TriggerError> {
    let spec: TriggerJobSpec =
      decode(payload, mode).map_err(|e| TriggerError::decode(&self.job.name, e))?;
    self.job.spec =
      serde_json::to_value(&spec).map_err(|e| TriggerError::decode(&self.job.name, e.into()))?;
    Ok(self.spec.insert(spec))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cadence_config::{JobType, Stage, TriggerType};
  use cadence_store::MemoryWorkflowStore;
  use serde_json::json;

  fn trigger_job(spec: Value) -> Job {
    Job {
      name: "trigger".to_string(),
      job_type: JobType::WorkflowTrigger,
      spec,
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

  #[test]
  fn test_instantiate_normalizes_yaml_payload() {
    let job = trigger_job(Value::String(
      "trigger_type: fixed\nfixed_workflow_list:\n  - workflow_name: nightly\n".to_string(),
    ));
    let workflow = workflow("release", vec![job.clone()]);

    let mut trigger = WorkflowTriggerJob::new(job, &workflow);
    trigger.instantiate().unwrap();

    assert_eq!(trigger.spec().unwrap().trigger_type, TriggerType::Fixed);
    assert_eq!(trigger.job().spec["fixed_workflow_list"][0]["workflow_name"], "nightly");

    // The normalized payload now passes the strict decode.
    trigger.set_preset().unwrap();
    let tasks = trigger.to_jobs(7).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].spec.workflow_trigger_events[0].project_name, "shop");
  }

  #[test]
  fn test_set_preset_rejects_embedded_document() {
    let job = trigger_job(Value::String("trigger_type: fixed".to_string()));
    let workflow = workflow("release", vec![]);

    let mut trigger = WorkflowTriggerJob::new(job, &workflow);
    let result = trigger.set_preset();

    assert!(matches!(result, Err(TriggerError::Decode { job, .. }) if job == "trigger"));
  }

  #[test]
  fn test_merge_args_replaces_spec() {
    let job = trigger_job(json!({
      "trigger_type": "fixed",
      "fixed_workflow_list": [{ "workflow_name": "nightly" }]
    }));
    let workflow = workflow("release", vec![job.clone()]);
    let args = trigger_job(json!({
      "trigger_type": "fixed",
      "is_enable_check": true,
      "fixed_workflow_list": [{ "workflow_name": "smoke" }, { "workflow_name": "nightly" }]
    }));

    let mut trigger = WorkflowTriggerJob::new(job, &workflow);
    trigger.merge_args(&args).unwrap();
    let tasks = trigger.to_jobs(1).unwrap();

    let names: Vec<_> = tasks[0]
      .spec
      .workflow_trigger_events
      .iter()
      .map(|event| event.workflow_name.as_str())
      .collect();
    assert_eq!(names, vec!["smoke", "nightly"]);
    assert!(tasks[0].spec.is_enable_check);
    assert_eq!(trigger.into_job().spec["is_enable_check"], true);
  }

  #[tokio::test]
  async fn test_lint_job_walks_targets() {
    let job = trigger_job(json!({
      "trigger_type": "common",
      "source": "runtime",
      "service_trigger_workflow": [
        { "service_name": "api", "service_module": "server", "workflow_name": "deploy-api" }
      ]
    }));
    let root = workflow("release", vec![job.clone()]);
    let store = MemoryWorkflowStore::new().with_workflow(workflow(
      "deploy-api",
      vec![Job {
        name: "compile".to_string(),
        job_type: JobType::Build,
        spec: json!({}),
      }],
    ));

    let mut trigger = WorkflowTriggerJob::new(job, &root);
    let result = trigger.lint_job(&store).await;

    assert!(matches!(
      result,
      Err(TriggerError::UnsupportedJobType { workflow, job }) if workflow == "deploy-api" && job == "compile"
    ));
  }
}
