//! Jupyter notebook embedding for liquid-style tags.
//!
//! Provides the `notebook` tag:
//!
//! ```text
//! {% notebook path/to/notebook.ipynb [ cells[start:end] ] [ language[lang] ] %}
//! ```
//!
//! The path is relative to the configured notebook directory inside the
//! content root. The tag expands to the highlighted cells, a `<style>` block
//! scoped to the notebook's wrapper element, and a small script include.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lq_notebook::NotebookTag;
//! use lq_renderer::{LiquidTags, MarkdownPipeline, TagRegistry, TagsConfig};
//!
//! let mut registry = TagRegistry::new();
//! lq_notebook::register(&mut registry, NotebookTag::new());
//!
//! let mut pipeline = MarkdownPipeline::new();
//! LiquidTags::new(TagsConfig::default(), Arc::new(registry)).install(&mut pipeline);
//!
//! let result = pipeline.render("{% notebook demo.ipynb cells[0:3] %}")?;
//! assert!(result.html.contains("<div id=\"nb-wrapper\">"));
//! # Ok::<(), lq_renderer::ExpansionError>(())
//! ```

mod css;
mod exporter;
mod grammar;
mod handler;
mod highlight;

pub use css::{
    CommandOutput, CommandRunner, CssCompiler, DEFAULT_COMPILER, DEFAULT_WRAPPER_ID, SystemRunner,
    scope_css, style_block,
};
pub use exporter::{
    DEFAULT_LANGUAGE, HIGHLIGHT_CLASS, HtmlExporter, NotebookRenderer, RenderedNotebook,
};
pub use grammar::{CellRange, NotebookArgs, SYNTAX, parse};
pub use handler::{CSS_INCLUDE, JS_INCLUDE, NotebookTag};
pub use highlight::{CLASS_PREFIX, THEME, highlight, stylesheet};

use lq_renderer::TagRegistry;

/// Name the notebook tag is registered under.
pub const TAG_NAME: &str = "notebook";

/// Register `tag` as the handler for `{% notebook ... %}`.
pub fn register(registry: &mut TagRegistry, tag: NotebookTag) {
    registry.register(TAG_NAME, tag);
}
