//! CLI error types.

use lq_config::ConfigError;
use lq_renderer::ExpansionError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Expansion(#[from] ExpansionError),
}
