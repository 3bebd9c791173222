//! Deferred string replacement.
//!
//! Used to restore stashed fragments in rendered HTML once every token is known.

/// Ordered list of `from -> to` substitutions applied to a string at once.
///
/// Callers register every substitution first and then call
/// [`apply()`](Self::apply), so the output buffer is rewritten at most once
/// per pattern that actually occurs. Patterns are applied in registration
/// order: a wrapped form such as `<p>TOKEN</p>` must be added before the
/// bare `TOKEN` to take effect.
///
/// # Example
///
/// ```
/// use lq_renderer::Replacements;
///
/// let mut html = "<p>@0@</p>\n<p>see @0@</p>\n".to_owned();
/// let mut replacements = Replacements::new();
/// replacements.add("<p>@0@</p>", "<figure></figure>");
/// replacements.add("@0@", "<em>figure</em>");
/// replacements.apply(&mut html);
///
/// assert_eq!(html, "<figure></figure>\n<p>see <em>figure</em></p>\n");
/// ```
#[derive(Debug, Default)]
pub struct Replacements {
    items: Vec<(String, String)>,
}

impl Replacements {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collector with room for `capacity` substitutions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Replace every occurrence of `from` with `to`.
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.items.push((from.into(), to.into()));
    }

    /// Apply all substitutions to `text`, consuming the collector.
    pub fn apply(self, text: &mut String) {
        for (from, to) in self.items {
            if from.is_empty() || !text.contains(&from) {
                continue;
            }
            *text = text.replace(&from, &to);
        }
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of registered substitutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
