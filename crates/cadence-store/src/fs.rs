use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cadence_config::Workflow;
use tokio::fs;
use tracing::{debug, warn};

use crate::{LookupError, WorkflowLookup};

/// Extensions tried, in order, when looking up a workflow file.
const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Filesystem-based workflow store.
///
/// Each workflow is a single file named after it:
/// ```text
/// {root}/
/// ├── build-and-release.yaml
/// └── deploy-api.json
/// ```
pub struct FsWorkflowStore {
  root: PathBuf,
}

impl FsWorkflowStore {
  /// Create a new filesystem store at the given root path.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory of the store.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// List the names of all stored workflows, sorted.
  pub async fn list_names(&self) -> Result<Vec<String>, LookupError> {
    let mut names = Vec::new();

    if !self.root.exists() {
      return Ok(names);
    }

    let mut entries = fs::read_dir(&self.root).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if !path.is_file() {
        continue;
      }
      let is_definition = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext));
      if is_definition && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
        names.push(stem.to_string());
      }
    }

    names.sort();
    names.dedup();
    Ok(names)
  }

  /// Names containing path components never map to a file in the store.
  fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
  }

  fn parse(path: &Path, content: &str) -> Result<Workflow, LookupError> {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some("json") => Ok(serde_json::from_str(content)?),
      _ => Ok(serde_yaml::from_str(content)?),
    }
  }
}

#[async_trait]
impl WorkflowLookup for FsWorkflowStore {
  async fn find_workflow(&self, name: &str) -> Result<Workflow, LookupError> {
    if !Self::is_valid_name(name) {
      return Err(LookupError::NotFound(name.to_string()));
    }

    for extension in EXTENSIONS {
      let path = self.root.join(format!("{}.{}", name, extension));
      let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
        Err(e) => return Err(e.into()),
      };

      debug!(workflow = %name, path = %path.display(), "loaded workflow definition");
      let workflow = Self::parse(&path, &content)?;
      if workflow.name != name {
        warn!(
          workflow = %name,
          declared = %workflow.name,
          "workflow file name does not match its declared name"
        );
        return Err(LookupError::NameMismatch {
          requested: name.to_string(),
          declared: workflow.name,
        });
      }
      return Ok(workflow);
    }

    Err(LookupError::NotFound(name.to_string()))
  }
}
