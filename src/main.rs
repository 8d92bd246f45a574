use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tributary_catalog::FsCatalog;
use tributary_config::TributaryConfig;
use tributary_model::{GroupRequest, ProcessForm};
use tributary_sort::{CreateSortConfigListener, DataFlowCompiler, INIT_SORT_TASK};
use tributary_store::SqliteStore;
use tributary_workflow::{ProcessDefinition, ProcessEngine, ProcessEvent};

const CREATE_GROUP_RESOURCE: &str = "create_group_resource";

/// Tributary - workflow-driven provisioning of streaming data flows
#[derive(Parser)]
#[command(name = "tributary")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.tributary)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Path to a JSON config file (default: {data_dir}/config.json if present)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile the sort data flows of a group and print them
  Compile {
    /// Path to the group request (JSON)
    group_file: PathBuf,
  },

  /// Manage processes
  Process {
    #[command(subcommand)]
    action: ProcessAction,
  },
}

#[derive(Subcommand)]
enum ProcessAction {
  /// Start a create_group_resource process from a form
  Start {
    /// Path to the process form (JSON)
    form_file: PathBuf,
  },

  /// Apply an event (COMPLETE, REJECT, CANCEL, TERMINATE, FAIL) to a process
  Submit {
    process_id: String,
    event: ProcessEvent,
  },

  /// Print a process and its tasks
  Show { process_id: String },

  /// List create_group_resource processes, oldest first
  List,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".tributary"),
  };
  let config = load_config(cli.config.as_deref(), &data_dir)?;
  debug!(data_dir = %data_dir.display(), "config_loaded");

  let Some(command) = cli.command else {
    println!("tributary - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    match command {
      Commands::Compile { group_file } => compile(&group_file, &data_dir, config).await,
      Commands::Process { action } => run_process(action, &data_dir, config).await,
    }
  })
}

fn load_config(path: Option<&Path>, data_dir: &Path) -> Result<TributaryConfig> {
  if let Some(path) = path {
    return TributaryConfig::from_file(path)
      .with_context(|| format!("failed to load config: {}", path.display()));
  }

  let default_path = data_dir.join("config.json");
  if default_path.exists() {
    return TributaryConfig::from_file(&default_path)
      .with_context(|| format!("failed to load config: {}", default_path.display()));
  }

  Ok(TributaryConfig::default())
}

fn compiler(data_dir: &Path, config: &TributaryConfig) -> DataFlowCompiler {
  let catalog = FsCatalog::new(data_dir.join("catalog"));
  DataFlowCompiler::new(Arc::new(catalog), config.cluster.clone())
}

async fn compile(group_file: &Path, data_dir: &Path, config: TributaryConfig) -> Result<()> {
  let content = tokio::fs::read_to_string(group_file)
    .await
    .with_context(|| format!("failed to read group file: {}", group_file.display()))?;
  let group: GroupRequest = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse group file: {}", group_file.display()))?;

  let compiled = compiler(data_dir, &config)
    .compile(&group)
    .await
    .with_context(|| format!("failed to compile group '{}'", group.group_id))?;

  for skipped in &compiled.skipped {
    eprintln!("Skipped stream {}: {}", skipped.stream_id, skipped.reason);
  }
  println!("{}", serde_json::to_string_pretty(&compiled.flows)?);

  Ok(())
}

async fn run_process(action: ProcessAction, data_dir: &Path, config: TributaryConfig) -> Result<()> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data dir: {}", data_dir.display()))?;

  let db_path = data_dir.join("tributary.db");
  let store = SqliteStore::connect(&format!("sqlite://{}", db_path.display()))
    .await
    .with_context(|| format!("failed to open store: {}", db_path.display()))?;

  let mut engine = ProcessEngine::new(Arc::new(store), &config.engine);
  engine.register_definition(
    ProcessDefinition::new(CREATE_GROUP_RESOURCE).with_task(INIT_SORT_TASK),
  );
  engine.register_listener(
    INIT_SORT_TASK,
    Arc::new(CreateSortConfigListener::new(compiler(data_dir, &config))),
  );

  match action {
    ProcessAction::Start { form_file } => {
      let content = tokio::fs::read_to_string(&form_file)
        .await
        .with_context(|| format!("failed to read form file: {}", form_file.display()))?;
      let form: ProcessForm = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse form file: {}", form_file.display()))?;

      let process = engine
        .start(CREATE_GROUP_RESOURCE, form)
        .await
        .context("failed to start process")?;
      engine.wait_idle().await;

      eprintln!("Started process: {}", process.process_id);
      println!("{}", serde_json::to_string_pretty(&process)?);
    }
    ProcessAction::Submit { process_id, event } => {
      let outcome = engine
        .submit(&process_id, event)
        .await
        .with_context(|| format!("failed to apply {} to process {}", event, process_id))?;
      engine.wait_idle().await;

      eprintln!("{:?}", outcome);
      let process = engine.get(&process_id).await?;
      println!("{}", serde_json::to_string_pretty(&process)?);
    }
    ProcessAction::Show { process_id } => {
      let process = engine.get(&process_id).await?;
      let tasks = engine.tasks(&process_id).await?;
      let output = serde_json::json!({ "process": process, "tasks": tasks });
      println!("{}", serde_json::to_string_pretty(&output)?);
    }
    ProcessAction::List => {
      let processes = engine.list(CREATE_GROUP_RESOURCE).await?;
      if processes.is_empty() {
        println!("No processes found.");
      }
      for process in processes {
        let group_id = process
          .form
          .group_request()
          .map(|group| group.group_id.as_str())
          .unwrap_or("-");
        println!(
          "{}  {:<10}  {}  {}",
          process.process_id,
          process.state.as_str(),
          group_id,
          process.updated_at.to_rfc3339()
        );
      }
    }
  }

  Ok(())
}
