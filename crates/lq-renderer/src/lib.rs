//! Liquid-style tag preprocessing for a markdown pipeline.
//!
//! This crate expands `{% tag args %}` invocations in raw markdown before it
//! reaches the markdown parser. Tags are resolved against a [`TagRegistry`]
//! that is populated once at startup; each handler returns replacement text
//! (usually a [`Stash`] token protecting an HTML fragment) that is spliced back
//! into the document at the exact position the tag occupied.
//!
//! # Architecture
//!
//! - [`liquid`]: registry, scanner, expander and the [`LiquidTags`] adapter
//! - [`MarkdownPipeline`]: host pipeline that runs [`Preprocessor`]s, renders
//!   with pulldown-cmark and restores stashed fragments
//! - [`HtmlStash`]: placeholder store for already-rendered HTML
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lq_renderer::{
//!     LiquidTags, MarkdownPipeline, TagContext, TagError, TagRegistry, TagsConfig,
//! };
//!
//! let mut registry = TagRegistry::new();
//! registry.register(
//!     "kbd",
//!     |ctx: &mut TagContext<'_>, _tag: &str, markup: &str| -> Result<String, TagError> {
//!         Ok(ctx.stash.store(format!("<kbd>{markup}</kbd>"), true))
//!     },
//! );
//!
//! let mut pipeline = MarkdownPipeline::new();
//! LiquidTags::new(TagsConfig::default(), Arc::new(registry)).install(&mut pipeline);
//!
//! let result = pipeline.render("Press {% kbd Ctrl+C %} to copy.").unwrap();
//! assert_eq!(result.html, "<p>Press <kbd>Ctrl+C</kbd> to copy.</p>\n");
//! ```

pub mod liquid;
mod pipeline;
mod replacements;
mod stash;

pub use liquid::{
    ExpansionError, LiquidTags, TagContext, TagError, TagExpander, TagHandler, TagRegistry,
    TagSpan, TagsConfig, scan,
};
pub use pipeline::{MarkdownPipeline, Preprocessor, RenderResult};
pub use replacements::Replacements;
pub use stash::{HtmlStash, Stash, escape_html};
