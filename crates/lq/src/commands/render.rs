//! `lq render` command implementation.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::Term;
use lq_config::{CliSettings, Config};
use lq_renderer::{LiquidTags, MarkdownPipeline};

use super::{build_registry, tags_config};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    input: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover lq.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Notebook directory inside the content root (overrides config).
    #[arg(long)]
    notebook_dir: Option<String>,

    /// LESS compiler executable (overrides config).
    #[arg(long, env = "LQ_CSS_COMPILER")]
    css_compiler: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            notebook_dir: self.notebook_dir,
            css_compiler: self.css_compiler,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        tracing::info!(
            input = %self.input.display(),
            content_dir = %config.content_dir.display(),
            "Rendering"
        );
        let markdown = fs::read_to_string(&self.input)?;
        let html = render(&config, &markdown, &output)?;

        if let Some(path) = self.output {
            fs::write(&path, html)?;
            output.success(&format!(
                "Rendered {} to {}",
                self.input.display(),
                path.display()
            ));
        } else {
            Term::stdout().write_str(&html)?;
        }
        Ok(())
    }
}

/// Render `markdown` with every registered tag installed.
fn render(config: &Config, markdown: &str, output: &Output) -> Result<String, CliError> {
    let registry = Arc::new(build_registry(config));
    let mut pipeline = MarkdownPipeline::new();
    LiquidTags::new(tags_config(config), registry).install(&mut pipeline);

    let result = pipeline.render(markdown)?;
    for warning in &result.warnings {
        output.warning(&format!("Warning: {warning}"));
    }
    Ok(result.html)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(input: PathBuf, output: Option<PathBuf>, config: PathBuf) -> RenderArgs {
        RenderArgs {
            input,
            output,
            config: Some(config),
            content_dir: None,
            notebook_dir: None,
            css_compiler: None,
            verbose: false,
        }
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("lq.toml");
        let input = dir.path().join("post.md");
        let out = dir.path().join("post.html");
        fs::write(&config, "").unwrap();
        fs::write(&input, "# Hello\n\n{% unknown tag %}\n").unwrap();

        args(input, Some(out.clone()), config).execute().unwrap();

        assert_eq!(
            fs::read_to_string(out).unwrap(),
            "<h1>Hello</h1>\n<p>{% unknown tag %}</p>\n"
        );
    }

    #[test]
    fn test_missing_notebook_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("lq.toml");
        let input = dir.path().join("post.md");
        fs::write(&config, "").unwrap();
        fs::write(&input, "{% notebook missing.ipynb %}").unwrap();

        let err = args(input, None, config).execute().unwrap_err();

        assert!(matches!(err, CliError::Expansion(_)));
        assert!(err.to_string().contains("could not be found"));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("lq.toml");
        fs::write(&config, "").unwrap();

        let err = args(dir.path().join("nope.md"), None, config)
            .execute()
            .unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
