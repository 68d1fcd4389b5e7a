use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use oss_manager::config::{self, AppConfig};
use oss_manager::message::MessageRenderer;
use oss_manager::notifier::drain;
use oss_manager::store::Registry;

#[derive(Parser)]
#[command(name = "oss-manager")]
#[command(version, about = "Track open source projects and notify about new releases")]
struct Cli {
    /// Database file (defaults to the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start tracking a project, or change its URL
    Add { name: String, url: String },
    /// Record an observed version and queue a notice for it
    Update { name: String, version: String },
    /// List tracked projects and their versions
    List,
    /// Print and acknowledge every pending update notice
    Notify,
    /// Print the database path
    Path,
}

fn init_logging(level: &str) -> anyhow::Result<WorkerGuard> {
    let log_path = config::log_path();
    let log_dir = log_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(config::data_dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

    let file_name = log_path
        .file_name()
        .context("Log path has no file name")?;
    let appender = tracing_appender::rolling::never(&log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let app_config = AppConfig::load(&config_path)?;
    let _guard = init_logging(&app_config.log.level)?;

    let db_path = cli.db.unwrap_or_else(|| app_config.db_path());
    let registry = Registry::new(&db_path, app_config.database.busy_timeout_ms)
        .with_context(|| format!("Failed to open registry at {:?}", db_path))?;

    match cli.command {
        Command::Add { name, url } => {
            registry.register_project(&name, &url)?;
            println!("Tracking {name} ({url})");
        }
        Command::Update { name, version } => {
            registry
                .record_version_update(&name, &version)
                .with_context(|| format!("Failed to record {version} for {name}"))?;
            println!("Recorded {version} for {name}");
        }
        Command::List => {
            let renderer = MessageRenderer::new()?;
            print!("{}", renderer.for_list(&registry.list_projects()?)?);
        }
        Command::Notify => {
            let renderer = MessageRenderer::new()?;
            drain(&registry, |bundle| {
                println!("{}", renderer.for_update(bundle)?);
                Ok(())
            })?;
        }
        Command::Path => println!("{}", registry.path().display()),
    }

    Ok(())
}
