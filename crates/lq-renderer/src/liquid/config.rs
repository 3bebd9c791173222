//! Configuration visible to tag handlers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default notebook directory, relative to the content root.
pub const DEFAULT_NOTEBOOK_DIR: &str = "notebooks";

/// Default content root.
pub const DEFAULT_CONTENT_DIR: &str = "content";

/// Read-only configuration passed to every tag handler.
///
/// Built once by the host and shared by reference; handlers cannot modify it.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use lq_renderer::TagsConfig;
///
/// let config = TagsConfig::default()
///     .with_content_dir("site/content")
///     .with_option("theme", "dark");
///
/// assert_eq!(config.notebook_root(), Path::new("site/content/notebooks"));
/// assert_eq!(config.option("theme"), Some("dark"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagsConfig {
    /// Content root that source paths are resolved against.
    pub content_dir: PathBuf,
    /// Notebook directory, relative to `content_dir`.
    pub notebook_dir: String,
    /// Host settings passed through unmodified.
    pub options: BTreeMap<String, String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            notebook_dir: DEFAULT_NOTEBOOK_DIR.to_owned(),
            options: BTreeMap::new(),
        }
    }
}

impl TagsConfig {
    /// Set the content root.
    #[must_use]
    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_dir = dir.into();
        self
    }

    /// Set the notebook directory.
    #[must_use]
    pub fn with_notebook_dir(mut self, dir: impl Into<String>) -> Self {
        self.notebook_dir = dir.into();
        self
    }

    /// Add a pass-through option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up a pass-through option.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Directory notebooks are resolved against: `content_dir/notebook_dir`.
    #[must_use]
    pub fn notebook_root(&self) -> PathBuf {
        self.content_dir.join(&self.notebook_dir)
    }

    /// Resolve a notebook path written in a tag.
    #[must_use]
    pub fn resolve_notebook(&self, src: impl AsRef<Path>) -> PathBuf {
        self.notebook_root().join(src)
    }
}
