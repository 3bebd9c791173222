//! The `notebook` tag handler.

use lq_renderer::{TagContext, TagError, TagHandler, TagsConfig};

use crate::css::{CssCompiler, DEFAULT_WRAPPER_ID, scope_css, style_block};
use crate::exporter::{HtmlExporter, NotebookRenderer};
use crate::grammar;

/// Stylesheet appended to the exporter's resources before scoping.
pub const CSS_INCLUDE: &str = include_str!("../assets/css_include.css");

/// Script appended after the notebook body.
pub const JS_INCLUDE: &str = include_str!("../assets/js_include.html");

/// Embeds a rendered notebook: `{% notebook path [cells[a:b]] [language[x]] %}`.
///
/// The notebook is looked up under `content_dir/notebook_dir`, rendered,
/// and its CSS scoped to a wrapper `<div>` through [`CssCompiler`]. The
/// resulting fragment is stashed as safe HTML and the tag is replaced with
/// the stash token.
pub struct NotebookTag {
    renderer: Box<dyn NotebookRenderer>,
    compiler: CssCompiler,
    wrapper_id: String,
}

impl NotebookTag {
    /// Create a handler using [`HtmlExporter`] and `lessc`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderer: Box::new(HtmlExporter::new()),
            compiler: CssCompiler::default(),
            wrapper_id: DEFAULT_WRAPPER_ID.to_owned(),
        }
    }

    /// Replace the notebook renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl NotebookRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the CSS compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: CssCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Set the id of the wrapper element styles are scoped to.
    #[must_use]
    pub fn with_wrapper_id(mut self, id: impl Into<String>) -> Self {
        self.wrapper_id = id.into();
        self
    }

    /// Build the HTML fragment for a tag's argument text.
    ///
    /// Steps run in a fixed order and stop at the first failure: argument
    /// parsing, the existence check, rendering, then CSS compilation.
    pub fn render_fragment(&self, config: &TagsConfig, markup: &str) -> Result<String, TagError> {
        let args = grammar::parse(markup)?;

        let path = config.resolve_notebook(&args.src);
        if !path.is_file() {
            return Err(TagError::SourceNotFound(path));
        }

        tracing::debug!(path = %path.display(), cells = ?args.cells, "Rendering notebook");
        let rendered = self
            .renderer
            .render(&path, args.cells, args.language.as_deref())?;

        let mut sheets = rendered.css;
        sheets.push(CSS_INCLUDE.to_owned());
        let css = self.compiler.compile(&scope_css(&self.wrapper_id, &sheets))?;

        let body = format!(
            "<div id=\"{}\">\n{}</div>",
            self.wrapper_id, rendered.body
        );

        Ok([style_block(&css), body, JS_INCLUDE.to_owned()].join("\n"))
    }
}

impl Default for NotebookTag {
    fn default() -> Self {
        Self::new()
    }
}

impl TagHandler for NotebookTag {
    fn expand(
        &self,
        ctx: &mut TagContext<'_>,
        _tag: &str,
        markup: &str,
    ) -> Result<String, TagError> {
        let fragment = self.render_fragment(ctx.config, markup)?;
        Ok(ctx.stash.store(fragment, true))
    }
}
