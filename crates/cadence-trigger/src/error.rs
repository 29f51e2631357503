use cadence_config::DecodeError;
use cadence_store::LookupError;
use thiserror::Error;

/// Errors that can occur while resolving or validating a trigger job.
#[derive(Debug, Error)]
pub enum TriggerError {
  /// A run-time service has no workflow configured for it.
  #[error("no workflow trigger info for service {service}-{module}")]
  MissingTriggerInfo { service: String, module: String },

  /// The job services are taken from is absent or of an unsupported kind.
  #[error("service from job {job_name} not found")]
  SourceJobNotFound { job_name: String },

  /// Unrecognized trigger type / source combination.
  #[error("unsupported trigger configuration: type={trigger_type}, source={trigger_source}")]
  UnsupportedTriggerConfiguration {
    trigger_type: String,
    trigger_source: String,
  },

  /// A triggered workflow does not exist.
  #[error("can't find workflow {name}")]
  UnknownWorkflow { name: String },

  /// The store failed while fetching a triggered workflow.
  #[error("failed to look up workflow {name}: {source}")]
  Lookup {
    name: String,
    #[source]
    source: LookupError,
  },

  /// Triggering would start a workflow already on the current trigger path.
  #[error("workflows cannot trigger each other in a loop, workflow: {workflow}")]
  CycleDetected { workflow: String },

  /// A triggered workflow contains a job kind that cannot be triggered.
  #[error("job {job} in workflow {workflow} is of a type that cannot be triggered")]
  UnsupportedJobType { workflow: String, job: String },

  /// The source job does not run before the trigger job.
  #[error("can not quote job {source_job} in job {trigger_job}")]
  InvalidOrdering {
    source_job: String,
    trigger_job: String,
  },

  /// A job's spec could not be decoded into the shape its kind requires.
  #[error("invalid spec for job {job}: {source}")]
  Decode {
    job: String,
    #[source]
    source: DecodeError,
  },
}

impl TriggerError {
  pub(crate) fn decode(job: &str, source: DecodeError) -> Self {
    TriggerError::Decode {
      job: job.to_string(),
      source,
    }
  }

  pub(crate) fn lookup(name: &str, source: LookupError) -> Self {
    match source {
      LookupError::NotFound(_) => TriggerError::UnknownWorkflow {
        name: name.to_string(),
      },
      source => TriggerError::Lookup {
        name: name.to_string(),
        source,
      },
    }
  }
}
