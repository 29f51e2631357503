use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when materializing a spec payload.
#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("invalid spec payload: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid yaml spec payload: {0}")]
  Yaml(#[from] serde_yaml::Error),
}

/// How strictly a payload is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
  /// Tolerates YAML-shaped payloads: a YAML document embedded as a string is
  /// parsed, and structured payloads round-trip through YAML first.
  ///
  /// Used when a job's configuration is first materialized.
  Yaml,
  /// Direct conversion of an already typed (or near-typed) payload.
  Strict,
}

/// Decode an opaque payload into a typed spec.
///
/// Both modes produce the same value for well-formed input.
pub fn decode<T: DeserializeOwned>(payload: &Value, mode: DecodeMode) -> Result<T, DecodeError> {
  match mode {
    DecodeMode::Strict => Ok(T::deserialize(payload)?),
    DecodeMode::Yaml => {
      let document = match payload {
        Value::String(text) => text.clone(),
        other => serde_yaml::to_string(other)?,
      };
      Ok(serde_yaml::from_str(&document)?)
    }
  }
}
