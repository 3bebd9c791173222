//! Tag registry.
//!
//! Maps tag names to handlers. Populated during startup and then shared
//! read-only (typically behind an `Arc`) with every [`TagExpander`](super::TagExpander).

use std::collections::HashMap;
use std::sync::Arc;

use super::{TagContext, TagError};

/// Handler for a liquid-style tag.
///
/// Receives the context, the tag name as written and the argument text with
/// surrounding whitespace removed. The returned string replaces the whole
/// `{% ... %}` span.
///
/// Closures with the matching signature implement this trait:
///
/// ```
/// use lq_renderer::{TagContext, TagError, TagRegistry};
///
/// let mut registry = TagRegistry::new();
/// registry.register(
///     "upper",
///     |_: &mut TagContext<'_>, _: &str, markup: &str| -> Result<String, TagError> {
///         Ok(markup.to_uppercase())
///     },
/// );
/// assert!(registry.contains("upper"));
/// ```
pub trait TagHandler: Send + Sync {
    /// Produce the replacement text for one tag occurrence.
    fn expand(&self, ctx: &mut TagContext<'_>, tag: &str, markup: &str)
    -> Result<String, TagError>;
}

impl<F> TagHandler for F
where
    F: Fn(&mut TagContext<'_>, &str, &str) -> Result<String, TagError> + Send + Sync,
{
    fn expand(
        &self,
        ctx: &mut TagContext<'_>,
        tag: &str,
        markup: &str,
    ) -> Result<String, TagError> {
        self(ctx, tag, markup)
    }
}

/// Registry mapping tag names to handlers.
///
/// Registering a name twice replaces the earlier handler and logs a warning;
/// the last registration wins.
#[derive(Default)]
pub struct TagRegistry {
    handlers: HashMap<String, Arc<dyn TagHandler>>,
}

impl TagRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `name`.
    ///
    /// Returns the handler that was previously registered under the same name.
    pub fn register<H: TagHandler + 'static>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> Option<Arc<dyn TagHandler>> {
        let name = name.into();
        let previous = self.handlers.insert(name.clone(), Arc::new(handler));
        if previous.is_some() {
            tracing::warn!(tag = %name, "Overriding previously registered tag handler");
        }
        previous
    }

    /// Look up the handler for `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&dyn TagHandler> {
        self.handlers.get(name).map(|handler| &**handler)
    }

    /// Check whether `name` has a handler.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered tag names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no tags are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRegistry")
            .field("tags", &self.names())
            .finish()
    }
}
