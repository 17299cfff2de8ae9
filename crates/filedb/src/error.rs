//! CLI error types.

use filedb_config::ConfigError;
use filedb_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),
}
