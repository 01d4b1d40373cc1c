//! Configuration for the `taskboard` command.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Command;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    latency: LatencyFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
}

/// `[latency]` section of the config file, in milliseconds.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LatencyFileConfig {
    login_ms: Option<u64>,
    signup_ms: Option<u64>,
    logout_ms: Option<u64>,
    add_ms: Option<u64>,
    update_ms: Option<u64>,
    delete_ms: Option<u64>,
    delete_many_ms: Option<u64>,
    update_many_ms: Option<u64>,
    reorder_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Simulated backend round-trip time per store operation.
///
/// Each operation validates its input, waits this long, then applies its
/// change against whatever state the store holds at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub login: Duration,
    pub signup: Duration,
    pub logout: Duration,
    pub add: Duration,
    pub update: Duration,
    pub delete: Duration,
    pub delete_many: Duration,
    pub update_many: Duration,
    pub reorder: Duration,
}

impl Latency {
    /// No simulated delay at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            login: Duration::ZERO,
            signup: Duration::ZERO,
            logout: Duration::ZERO,
            add: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
            delete_many: Duration::ZERO,
            update_many: Duration::ZERO,
            reorder: Duration::ZERO,
        }
    }

    /// Applies the same delay to every operation.
    #[must_use]
    pub const fn uniform(delay: Duration) -> Self {
        Self {
            login: delay,
            signup: delay,
            logout: delay,
            add: delay,
            update: delay,
            delete: delay,
            delete_many: delay,
            update_many: delay,
            reorder: delay,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(800),
            signup: Duration::from_millis(800),
            logout: Duration::from_millis(400),
            add: Duration::from_millis(400),
            update: Duration::from_millis(400),
            delete: Duration::from_millis(300),
            delete_many: Duration::from_millis(400),
            update_many: Duration::from_millis(400),
            reorder: Duration::from_millis(200),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Directory holding one JSON document per storage key.
    pub data_dir: PathBuf,
    /// Simulated latency per operation.
    pub latency: Latency,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            latency: Latency::default(),
        }
    }
}

impl BoardConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or if any config file fails to parse.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > file > default. `--instant` zeroes every latency.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        let latency = if cli.instant {
            Latency::none()
        } else {
            let d = defaults.latency;
            let ms = |value: Option<u64>, fallback: Duration| {
                value.map_or(fallback, Duration::from_millis)
            };
            let f = &file.latency;
            Latency {
                login: ms(f.login_ms, d.login),
                signup: ms(f.signup_ms, d.signup),
                logout: ms(f.logout_ms, d.logout),
                add: ms(f.add_ms, d.add),
                update: ms(f.update_ms, d.update),
                delete: ms(f.delete_ms, d.delete),
                delete_many: ms(f.delete_many_ms, d.delete_many),
                update_many: ms(f.update_many_ms, d.update_many),
                reorder: ms(f.reorder_ms, d.reorder),
            }
        };

        Self {
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .unwrap_or(defaults.data_dir),
            latency,
        }
    }
}

/// Waits out one simulated backend round trip.
pub(crate) async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// Command-line arguments for `taskboard`.
#[derive(clap::Parser, Debug)]
#[command(version, about = "Local task board")]
pub struct CliArgs {
    /// Directory for board data (default: platform data dir + `taskboard`).
    #[arg(long, global = true, env = "TASKBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the simulated backend latency.
    #[arg(long, global = true)]
    pub instant: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("taskboard")
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
