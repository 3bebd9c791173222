//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod tags;

pub(crate) use render::RenderArgs;
pub(crate) use tags::TagsArgs;

use lq_config::Config;
use lq_notebook::{CssCompiler, NotebookTag};
use lq_renderer::{TagRegistry, TagsConfig};

/// Build the tag registry. This is the only place tags are registered.
pub(crate) fn build_registry(config: &Config) -> TagRegistry {
    let mut registry = TagRegistry::new();
    lq_notebook::register(
        &mut registry,
        NotebookTag::new()
            .with_compiler(CssCompiler::new(config.notebook.css_compiler.clone()))
            .with_wrapper_id(config.notebook.wrapper_id.clone()),
    );
    registry
}

/// Configuration handed to tag handlers.
pub(crate) fn tags_config(config: &Config) -> TagsConfig {
    TagsConfig {
        content_dir: config.content_dir.clone(),
        notebook_dir: config.tags.notebook_dir.clone(),
        options: config.settings.clone(),
    }
}
