//! Cadence Trigger
//!
//! This crate resolves and validates `workflow_trigger` jobs: pipeline steps
//! that start other workflows when they run.
//!
//! Resolution (at run time) turns a trigger job's spec into the ordered list of
//! [`TriggerEvent`]s it produces and wraps them into a [`TaskDescriptor`] for the
//! execution engine. Validation (when a workflow is saved) proves the trigger
//! graph reachable from the job cannot loop back onto itself, that every
//! reachable workflow only holds triggerable jobs, and that a job-sourced
//! trigger runs after its source job.
//!
//! [`WorkflowTriggerJob`] drives a single job through both paths;
//! [`lint_workflow`] validates every trigger job of a workflow.

mod cycle;
mod error;
mod job;
mod lint;
mod rank;
mod repo;
mod resolver;
mod task;

pub use cycle::CycleValidator;
pub use error::TriggerError;
pub use job::WorkflowTriggerJob;
pub use lint::lint_workflow;
pub use rank::{job_ranks, validate_ordering};
pub use repo::RepoParamResolver;
pub use resolver::TriggerResolver;
pub use task::{TaskDescriptor, TriggerEvent, TriggerTaskSpec};
