//! CLI command implementations.

pub(crate) mod record;
pub(crate) mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use filedb_config::{CliSettings, Config};
use filedb_store::{Driver, JsonCodec, Options, TracingLogger};
use tracing::level_filters::LevelFilter;

use crate::error::CliError;

pub(crate) use record::{DeleteArgs, ReadAllArgs, ReadArgs, WriteArgs};
pub(crate) use seed::SeedArgs;

/// Options shared by every command.
#[derive(Args, Debug)]
pub(crate) struct StoreArgs {
    /// Path to configuration file (default: auto-discover filedb.toml).
    #[arg(short, long, env = "FILEDB_CONFIG")]
    config: Option<PathBuf>,

    /// Store root directory (overrides config).
    #[arg(short, long, env = "FILEDB_ROOT")]
    root: Option<PathBuf>,

    /// Enable verbose output (debug logging).
    #[arg(short, long)]
    pub verbose: bool,
}

impl StoreArgs {
    /// Load configuration with these arguments applied on top.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            root: self.root.clone(),
            log_level: self.verbose.then(|| "debug".to_owned()),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Driver logger for the CLI.
///
/// Forwards every level; the subscriber's `EnvFilter` decides what is shown.
fn driver_logger() -> TracingLogger {
    TracingLogger::new(LevelFilter::TRACE)
}

/// Open the store described by `config`.
pub(crate) fn open_driver(config: &Config) -> Result<Driver, CliError> {
    let logger = driver_logger();
    let options = Options::new(JsonCodec::with_indent(
        config.store_resolved.indent.clone(),
    ))
    .with_logger(Arc::new(logger));
    Ok(Driver::open_with(
        config.store_resolved.root.clone(),
        options,
    )?)
}
