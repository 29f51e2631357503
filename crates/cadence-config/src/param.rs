use serde::{Deserialize, Serialize};

use crate::enums::RepoSource;

/// Parameter type whose value is a repository descriptor.
pub const REPO_PARAM_TYPE: &str = "repo";

/// A parameter passed to a triggered workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
  pub name: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
  /// Parameter kind, e.g. "string", "choice" or "repo".
  #[serde(rename = "type")]
  pub params_type: String,
  #[serde(default)]
  pub value: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub choice_option: Vec<String>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub default: String,
  #[serde(default)]
  pub is_credential: bool,
  /// Set when `params_type` is "repo".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repo: Option<Repo>,
}

impl Param {
  pub fn is_repo(&self) -> bool {
    self.params_type == REPO_PARAM_TYPE
  }
}

/// A code repository as referenced by build jobs and repo parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repo {
  /// Code host kind, e.g. "gitlab".
  pub source: String,
  pub repo_owner: String,
  pub repo_namespace: String,
  pub repo_name: String,
  pub branch: String,
  pub tag: String,
  pub prs: Vec<i64>,
  pub commit_id: String,
  pub codehost_id: i64,
  pub remote_name: String,
  pub checkout_path: String,
  pub submodules: bool,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub source_from: Option<RepoSource>,
  /// Build job to copy the repository from when `source_from` is `from_job`.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub job_name: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub service_name: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub service_module: String,
  /// Position of the repository within the matching build entry.
  pub job_repo_index: usize,
}

impl Repo {
  pub fn is_from_job(&self) -> bool {
    self.source_from == Some(RepoSource::FromJob)
  }
}
