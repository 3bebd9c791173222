//! Tag handler context.
//!
//! Gives handlers read access to configuration and append access to the stash
//! without exposing the pipeline itself.

use std::path::PathBuf;

use super::TagsConfig;
use crate::stash::Stash;

/// Context passed to every tag handler invocation.
///
/// # Example
///
/// ```
/// use lq_renderer::{HtmlStash, Stash, TagContext, TagsConfig};
///
/// let config = TagsConfig::default();
/// let mut stash = HtmlStash::new();
/// let mut ctx = TagContext::new(&config, &mut stash, 3);
///
/// let token = ctx.stash.store("<hr>".to_owned(), true);
/// assert_eq!(ctx.line, 3);
/// assert_eq!(stash.len(), 1);
/// # let _ = token;
/// ```
pub struct TagContext<'a> {
    /// Configuration shared by all handlers.
    pub config: &'a TagsConfig,
    /// Store for fragments that must survive markdown rendering untouched.
    pub stash: &'a mut dyn Stash,
    /// Line where the tag starts (1-indexed).
    pub line: usize,
}

impl<'a> TagContext<'a> {
    /// Create a context for a tag starting at `line`.
    pub fn new(config: &'a TagsConfig, stash: &'a mut dyn Stash, line: usize) -> Self {
        Self {
            config,
            stash,
            line,
        }
    }

    /// Resolve a notebook path against the configured notebook directory.
    #[must_use]
    pub fn resolve_notebook(&self, src: &str) -> PathBuf {
        self.config.resolve_notebook(src)
    }
}
