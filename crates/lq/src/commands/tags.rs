//! `lq tags` command implementation.

use std::path::PathBuf;

use clap::Args;
use console::Term;
use lq_config::Config;

use super::build_registry;
use crate::error::CliError;

/// Arguments for the tags command.
#[derive(Args)]
pub(crate) struct TagsArgs {
    /// Path to configuration file (default: auto-discover lq.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TagsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let registry = build_registry(&config);

        let term = Term::stdout();
        for name in registry.names() {
            term.write_line(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_error() {
        let args = TagsArgs {
            config: Some(PathBuf::from("/nonexistent/lq.toml")),
        };
        assert!(matches!(args.execute(), Err(CliError::Config(_))));
    }
}
