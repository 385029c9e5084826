use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use taskdeck_app::TaskdeckApp;
use taskdeck_core::query::SortDirection;
use tracing_subscriber::EnvFilter;

mod commands;
mod console;
mod error;
mod settings;

use console::{ConsoleNotifier, PromptConfirmer};
use error::CliError;
use settings::{LogFormat, LoggingConfig, TaskdeckConfig};

#[derive(Parser, Debug)]
#[command(name = "taskdeck", version)]
#[command(about = "Taskdeck - a local task list")]
struct Cli {
    /// TOML configuration file (default: ./taskdeck.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a task
    Add {
        text: String,
        /// Category name (default: General)
        #[arg(long)]
        category: Option<String>,
    },
    /// List tasks, incomplete first
    List {
        /// Case-insensitive text search
        #[arg(long)]
        search: Option<String>,
        /// Category name, or All
        #[arg(long)]
        category: Option<String>,
        /// Creation-time order (asc, desc)
        #[arg(long, default_value = "asc")]
        sort: SortDirection,
        /// Collapse the completed section
        #[arg(long)]
        hide_completed: bool,
    },
    /// Show one task
    Show { id: String },
    /// Change a task's text or category
    Edit {
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Mark a task completed
    Done { id: String },
    /// Mark a task not completed
    Reopen { id: String },
    /// Delete a task
    Delete { id: String },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Database path, schema version and record counts
    Info,
}

#[derive(Subcommand, Debug)]
enum CategoryCommands {
    /// List categories
    List,
    /// Create a category
    Add { name: String },
    /// Rename a category; tasks keep the old name
    Rename { id: String, name: String },
    /// Delete a category; tasks keep their category text
    Delete { id: String },
}

fn init_logging(logging: &LoggingConfig, json: bool) {
    // RUST_LOG wins over the configured level.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = if json || logging.format == LogFormat::Json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

async fn run(cli: Cli, config: TaskdeckConfig) -> Result<(), CliError> {
    let app = TaskdeckApp::open(
        config.store.clone(),
        Arc::new(PromptConfirmer::new(cli.yes)),
        Arc::new(ConsoleNotifier),
    )
    .await?;

    let result = commands::execute(&app, cli.command, &config.ui).await;
    app.shutdown();
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match TaskdeckConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_db_override(cli.db.clone()),
        Err(e) => {
            init_logging(&LoggingConfig::default(), cli.json_logs);
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config.logging, cli.json_logs);

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}
