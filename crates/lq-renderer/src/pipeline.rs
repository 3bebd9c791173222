//! Host markdown pipeline.
//!
//! Runs line-oriented preprocessors over the raw document, renders the result
//! with pulldown-cmark and restores stashed fragments into the HTML.

use pulldown_cmark::{Options, Parser, html};

use crate::liquid::ExpansionError;
use crate::stash::{HtmlStash, Stash};

/// Result of rendering a document.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Warnings reported by preprocessors (e.g., nested tag delimiters).
    pub warnings: Vec<String>,
}

/// Stage that rewrites the raw document before markdown parsing.
pub trait Preprocessor {
    /// Unique name used to detect repeated installation.
    fn name(&self) -> &str;

    /// Transform the document's lines.
    fn run(
        &mut self,
        lines: Vec<String>,
        stash: &mut dyn Stash,
    ) -> Result<Vec<String>, ExpansionError>;

    /// Drain warnings produced by the last [`run`](Self::run).
    fn take_warnings(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Markdown renderer with an ordered list of preprocessors.
///
/// A fresh [`HtmlStash`] is used for every [`render`](Self::render) call, so
/// tokens never leak between documents.
pub struct MarkdownPipeline {
    preprocessors: Vec<Box<dyn Preprocessor>>,
    gfm: bool,
}

impl MarkdownPipeline {
    /// Create a pipeline with GFM enabled and no preprocessors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            gfm: true,
        }
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Check whether a preprocessor named `name` is installed.
    #[must_use]
    pub fn has_preprocessor(&self, name: &str) -> bool {
        self.preprocessors.iter().any(|p| p.name() == name)
    }

    /// Append a preprocessor. Preprocessors run in insertion order.
    pub fn add_preprocessor(&mut self, preprocessor: Box<dyn Preprocessor>) {
        self.preprocessors.push(preprocessor);
    }

    /// Names of installed preprocessors in run order.
    #[must_use]
    pub fn preprocessor_names(&self) -> Vec<&str> {
        self.preprocessors.iter().map(|p| p.name()).collect()
    }

    fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render `markdown` to HTML.
    pub fn render(&mut self, markdown: &str) -> Result<RenderResult, ExpansionError> {
        let mut stash = HtmlStash::new();
        let mut warnings = Vec::new();

        let mut lines: Vec<String> = markdown.split('\n').map(str::to_owned).collect();
        for preprocessor in &mut self.preprocessors {
            lines = preprocessor.run(lines, &mut stash)?;
            warnings.extend(preprocessor.take_warnings());
        }
        let source = lines.join("\n");

        let parser = Parser::new_ext(&source, self.parser_options());
        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, parser);

        stash.restore(&mut output);

        Ok(RenderResult {
            html: output,
            warnings,
        })
    }
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new()
    }
}
