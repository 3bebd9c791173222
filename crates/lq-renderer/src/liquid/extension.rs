//! Pipeline adapter.

use std::sync::Arc;

use super::{ExpansionError, TagExpander, TagRegistry, TagsConfig};
use crate::pipeline::{MarkdownPipeline, Preprocessor};
use crate::stash::Stash;

/// Installs liquid tag expansion into a [`MarkdownPipeline`].
///
/// Runs as a [`Preprocessor`] named [`LiquidTags::NAME`], before markdown
/// parsing, so tag output is seen by the parser only as stash tokens or
/// plain markdown.
pub struct LiquidTags {
    expander: TagExpander,
}

impl LiquidTags {
    /// Preprocessor name registered with the pipeline.
    pub const NAME: &'static str = "liquid_tags";

    /// Create the adapter for `registry` with handler configuration `config`.
    #[must_use]
    pub fn new(config: TagsConfig, registry: Arc<TagRegistry>) -> Self {
        Self {
            expander: TagExpander::new(config, registry),
        }
    }

    /// Add the adapter to `pipeline`.
    ///
    /// Returns `false` without changing the pipeline if it already has a
    /// liquid tags preprocessor; a second copy would expand tags produced
    /// by the first.
    pub fn install(self, pipeline: &mut MarkdownPipeline) -> bool {
        if pipeline.has_preprocessor(Self::NAME) {
            tracing::debug!(preprocessor = Self::NAME, "Preprocessor already installed, skipping");
            return false;
        }
        pipeline.add_preprocessor(Box::new(self));
        true
    }

    /// Configuration passed to handlers.
    #[must_use]
    pub fn config(&self) -> &TagsConfig {
        self.expander.config()
    }
}

impl Preprocessor for LiquidTags {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(
        &mut self,
        lines: Vec<String>,
        stash: &mut dyn Stash,
    ) -> Result<Vec<String>, ExpansionError> {
        self.expander.expand_lines(&lines, stash)
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.expander.take_warnings()
    }
}
