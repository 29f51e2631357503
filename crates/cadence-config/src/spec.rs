use serde::{Deserialize, Serialize};

use crate::decode::{DecodeError, DecodeMode, decode};
use crate::enums::{JobType, TriggerSource, TriggerType};
use crate::param::{Param, Repo};
use crate::service::ServiceIdentity;
use crate::workflow::Job;

/// Spec of a `workflow_trigger` job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerJobSpec {
  pub trigger_type: TriggerType,
  /// Only meaningful for `common` triggers.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<TriggerSource>,
  /// Job whose services are used when `source` is `from_job`.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub source_job_name: String,
  /// Services chosen at run time when `source` is `runtime`.
  #[serde(default)]
  pub source_service: Vec<ServiceIdentity>,
  /// Workflow to start per service. On duplicate services the last entry wins.
  #[serde(default)]
  pub service_trigger_workflow: Vec<ServiceTriggerWorkflowInfo>,
  #[serde(default)]
  pub fixed_workflow_list: Vec<FixedWorkflow>,
  #[serde(default)]
  pub is_enable_check: bool,
}

impl TriggerJobSpec {
  /// Whether the services come from an earlier job of the same workflow.
  pub fn is_from_job(&self) -> bool {
    self.trigger_type == TriggerType::Common && self.source == Some(TriggerSource::FromJob)
  }

  /// Names of the per-service target workflows, in declaration order.
  /// May contain duplicates. `fixed_workflow_list` is not included.
  pub fn service_workflow_names(&self) -> impl Iterator<Item = &str> {
    self
      .service_trigger_workflow
      .iter()
      .map(|info| info.workflow_name.as_str())
  }
}

/// The workflow started for one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTriggerWorkflowInfo {
  pub service_name: String,
  pub service_module: String,
  pub workflow_name: String,
  #[serde(default)]
  pub params: Vec<Param>,
}

impl ServiceTriggerWorkflowInfo {
  pub fn identity(&self) -> ServiceIdentity {
    ServiceIdentity::new(&self.service_name, &self.service_module)
  }
}

/// A workflow started unconditionally by a `fixed` trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedWorkflow {
  pub workflow_name: String,
  #[serde(default)]
  pub params: Vec<Param>,
}

/// Spec of a `build` job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildJobSpec {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub docker_registry_id: String,
  #[serde(default)]
  pub service_and_builds: Vec<ServiceAndBuild>,
}

/// One service module built by a build job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAndBuild {
  pub service_name: String,
  pub service_module: String,
  #[serde(default)]
  pub build_name: String,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub repos: Vec<Repo>,
}

/// Spec of a `deploy` job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployJobSpec {
  #[serde(default)]
  pub env: String,
  #[serde(default)]
  pub production: bool,
  #[serde(default)]
  pub service_and_images: Vec<ServiceAndImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAndImage {
  pub service_name: String,
  pub service_module: String,
  #[serde(default)]
  pub image: String,
}

/// Spec of a `distribute_image` job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributeImageJobSpec {
  #[serde(default)]
  pub source_registry_id: String,
  #[serde(default)]
  pub target_registry_id: String,
  #[serde(default)]
  pub targets: Vec<DistributeTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributeTarget {
  pub service_name: String,
  pub service_module: String,
  #[serde(default)]
  pub source_tag: String,
  #[serde(default)]
  pub target_tag: String,
  #[serde(default)]
  pub image: String,
}

/// A job's spec decoded according to its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSpec {
  Build(BuildJobSpec),
  Deploy(DeployJobSpec),
  DistributeImage(DistributeImageJobSpec),
  WorkflowTrigger(TriggerJobSpec),
  /// Kinds whose spec has no shape this crate cares about.
  Opaque {
    kind: JobType,
    payload: serde_json::Value,
  },
}

impl JobSpec {
  pub fn kind(&self) -> JobType {
    match self {
      JobSpec::Build(_) => JobType::Build,
      JobSpec::Deploy(_) => JobType::Deploy,
      JobSpec::DistributeImage(_) => JobType::DistributeImage,
      JobSpec::WorkflowTrigger(_) => JobType::WorkflowTrigger,
      JobSpec::Opaque { kind, .. } => kind.clone(),
    }
  }

  /// Service modules the job produces, in declaration order.
  ///
  /// Returns `None` for kinds that do not act on services.
  pub fn service_identities(&self) -> Option<Vec<ServiceIdentity>> {
    match self {
      JobSpec::Build(spec) => Some(
        spec
          .service_and_builds
          .iter()
          .map(|build| ServiceIdentity::new(&build.service_name, &build.service_module))
          .collect(),
      ),
      JobSpec::Deploy(spec) => Some(
        spec
          .service_and_images
          .iter()
          .map(|deploy| ServiceIdentity::new(&deploy.service_name, &deploy.service_module))
          .collect(),
      ),
      JobSpec::DistributeImage(spec) => Some(
        spec
          .targets
          .iter()
          .map(|target| ServiceIdentity::new(&target.service_name, &target.service_module))
          .collect(),
      ),
      JobSpec::WorkflowTrigger(_) | JobSpec::Opaque { .. } => None,
    }
  }
}

impl Job {
  /// Decode the job's payload into the spec for its kind.
  pub fn decode_spec(&self, mode: DecodeMode) -> Result<JobSpec, DecodeError> {
    let spec = match &self.job_type {
      JobType::Build => JobSpec::Build(decode(&self.spec, mode)?),
      JobType::Deploy => JobSpec::Deploy(decode(&self.spec, mode)?),
      JobType::DistributeImage => JobSpec::DistributeImage(decode(&self.spec, mode)?),
      JobType::WorkflowTrigger => JobSpec::WorkflowTrigger(decode(&self.spec, mode)?),
      kind => JobSpec::Opaque {
        kind: kind.clone(),
        payload: self.spec.clone(),
      },
    };
    Ok(spec)
  }
}
