//! Cadence Config
//!
//! This crate contains the serializable pipeline types for Cadence: workflows,
//! their stages and jobs, and the typed specs a job's opaque payload decodes into.
//!
//! Definitions can be loaded from:
//! - JSON or YAML files (via the filesystem store)
//! - Database storage (as JSON blobs)
//!
//! A job's `spec` stays an untyped [`serde_json::Value`] until a consumer asks for
//! it through [`Job::decode_spec`] or [`decode`], which materialize it into the
//! shape required by the job's kind.

mod decode;
mod enums;
mod param;
mod service;
mod spec;
mod workflow;

pub use decode::{DecodeError, DecodeMode, decode};
pub use enums::{JobType, RepoSource, TriggerSource, TriggerType};
pub use param::{Param, REPO_PARAM_TYPE, Repo};
pub use service::ServiceIdentity;
pub use spec::{
  BuildJobSpec, DeployJobSpec, DistributeImageJobSpec, DistributeTarget, FixedWorkflow, JobSpec,
  ServiceAndBuild, ServiceAndImage, ServiceTriggerWorkflowInfo, TriggerJobSpec,
};
pub use workflow::{Job, Stage, Workflow};
