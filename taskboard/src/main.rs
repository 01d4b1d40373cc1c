//! `taskboard`: manage a local task board from the command line.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! taskboard signup me@example.com --password 'Sup3r$ecret'
//! taskboard add "Write release notes" --priority high --tag docs
//! taskboard list --status todo
//! taskboard move <task-id> in-progress 0
//!
//! # Skip the simulated backend latency
//! taskboard --instant list
//! ```

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::Board;
use taskboard::cli;
use taskboard::config::{BoardConfig, CliArgs};
use taskboard::storage::FileStorage;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match BoardConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            BoardConfig::default()
        }
    };

    // Logs go to a file so command output on stdout stays clean.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(data_dir = %config.data_dir.display(), "taskboard starting");

    let storage = Arc::new(FileStorage::new(config.data_dir));
    let board = Board::init(storage, config.latency);

    let result = cli::run(&board, cli.command).await;
    board.shutdown();

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::info!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
