use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cadence_config::{Job, JobType, Workflow};
use cadence_store::{FsWorkflowStore, WorkflowLookup};
use cadence_trigger::{WorkflowTriggerJob, lint_workflow};

const DEFAULT_LOG_FILTER: &str = "cadence=info,cadence_store=info,cadence_trigger=info";

/// Cadence - workflow trigger resolution and validation
#[derive(Parser)]
#[command(name = "cadence")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.cadence)
  #[arg(long, global = true, env = "CADENCE_DATA_DIR")]
  data_dir: Option<PathBuf>,

  /// Directory holding workflow definitions (default: <data-dir>/workflows)
  #[arg(long, global = true)]
  workflows_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate the trigger jobs of a workflow
  Lint {
    /// Name of the workflow to lint (default: every stored workflow)
    workflow: Option<String>,

    /// Only lint this trigger job
    #[arg(long)]
    job: Option<String>,
  },

  /// Print the tasks a trigger job produces
  Resolve {
    /// Name of the workflow holding the trigger job
    workflow: String,

    /// The trigger job to resolve
    #[arg(long)]
    job: String,

    /// Job file (JSON or YAML) whose spec replaces the stored one
    #[arg(long)]
    args: Option<PathBuf>,

    /// Task ID recorded on the produced tasks
    #[arg(long, default_value_t = 0)]
    task_id: i64,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();

  let workflows_dir = match cli.workflows_dir {
    Some(dir) => dir,
    None => {
      let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::home_dir()
          .context("could not determine home directory")?
          .join(".cadence"),
      };
      data_dir.join("workflows")
    }
  };
  let store = FsWorkflowStore::new(workflows_dir);
  debug!(root = %store.root().display(), "using workflow store");

  match cli.command {
    Some(Commands::Lint { workflow, job }) => {
      lint(&store, workflow, job)?;
    }
    Some(Commands::Resolve {
      workflow,
      job,
      args,
      task_id,
    }) => {
      resolve(&store, workflow, job, args, task_id)?;
    }
    None => {
      println!("cadence - use --help to see available commands");
    }
  }

  Ok(())
}

fn lint(
  store: &FsWorkflowStore,
  workflow_name: Option<String>,
  job_name: Option<String>,
) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    match workflow_name {
      Some(workflow_name) => lint_async(store, workflow_name, job_name).await,
      None => {
        if job_name.is_some() {
          bail!("--job requires a workflow name");
        }
        let names = store
          .list_names()
          .await
          .with_context(|| format!("failed to list workflows in {}", store.root().display()))?;
        for name in names {
          lint_async(store, name, None).await?;
        }
        Ok(())
      }
    }
  })
}

async fn lint_async(
  store: &FsWorkflowStore,
  workflow_name: String,
  job_name: Option<String>,
) -> Result<()> {
  let workflow = load_workflow(store, &workflow_name).await?;

  match job_name {
    Some(job_name) => {
      let job = trigger_job(&workflow, &job_name)?;
      WorkflowTriggerJob::new(job, &workflow)
        .lint_job(store)
        .await
        .with_context(|| format!("lint failed for job '{}'", job_name))?;
      eprintln!("Trigger job {} of {} is valid", job_name, workflow.name);
    }
    None => {
      let linted = lint_workflow(&workflow, store)
        .await
        .with_context(|| format!("lint failed for workflow '{}'", workflow.name))?;
      eprintln!("Workflow {} is valid ({} trigger jobs)", workflow.name, linted);
    }
  }

  Ok(())
}

fn resolve(
  store: &FsWorkflowStore,
  workflow_name: String,
  job_name: String,
  args: Option<PathBuf>,
  task_id: i64,
) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { resolve_async(store, workflow_name, job_name, args, task_id).await })
}

async fn resolve_async(
  store: &FsWorkflowStore,
  workflow_name: String,
  job_name: String,
  args: Option<PathBuf>,
  task_id: i64,
) -> Result<()> {
  let workflow = load_workflow(store, &workflow_name).await?;
  let job = trigger_job(&workflow, &job_name)?;

  let mut trigger = WorkflowTriggerJob::new(job, &workflow);
  trigger
    .instantiate()
    .with_context(|| format!("failed to load spec of job '{}'", job_name))?;

  if let Some(args_file) = args {
    let args_job = read_job_file(&args_file).await?;
    trigger
      .merge_args(&args_job)
      .with_context(|| format!("failed to merge args from {}", args_file.display()))?;
  }

  let tasks = trigger
    .to_jobs(task_id)
    .with_context(|| format!("failed to resolve job '{}'", job_name))?;

  println!("{}", serde_json::to_string_pretty(&tasks)?);

  Ok(())
}

async fn load_workflow(store: &FsWorkflowStore, name: &str) -> Result<Workflow> {
  store
    .find_workflow(name)
    .await
    .with_context(|| format!("failed to load workflow '{}' from {}", name, store.root().display()))
}

fn trigger_job(workflow: &Workflow, job_name: &str) -> Result<Job> {
  let job = workflow
    .get_job(job_name)
    .with_context(|| format!("job '{}' not found in workflow '{}'", job_name, workflow.name))?;

  if job.job_type != JobType::WorkflowTrigger {
    bail!(
      "job '{}' is a {} job, not a {} job",
      job_name,
      job.job_type,
      JobType::WorkflowTrigger
    );
  }

  Ok(job.clone())
}

async fn read_job_file(path: &Path) -> Result<Job> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read job file: {}", path.display()))?;

  let job = match path.extension().and_then(|ext| ext.to_str()) {
    Some("json") => serde_json::from_str(&content)
      .with_context(|| format!("failed to parse job file: {}", path.display()))?,
    _ => serde_yaml::from_str(&content)
      .with_context(|| format!("failed to parse job file: {}", path.display()))?,
  };

  Ok(job)
}
