//! Tag expansion.
//!
//! Replaces registered tags with their handlers' output in a single pass,
//! copying everything between tags through unchanged.

use std::sync::Arc;

use super::{ExpansionError, TagContext, TagRegistry, TagsConfig, scan};
use crate::stash::Stash;

/// Expands liquid-style tags in a document.
///
/// Tags are processed strictly left to right. For each span:
///
/// - registered name: the span is replaced with the handler's return value
/// - unknown or blank name: the span is copied through as written
///
/// The first handler error aborts the document; no partial output is produced.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lq_renderer::{HtmlStash, TagContext, TagError, TagExpander, TagRegistry, TagsConfig};
///
/// let mut registry = TagRegistry::new();
/// registry.register(
///     "year",
///     |_: &mut TagContext<'_>, _: &str, _: &str| -> Result<String, TagError> {
///         Ok("2024".to_owned())
///     },
/// );
///
/// let mut expander = TagExpander::new(TagsConfig::default(), Arc::new(registry));
/// let mut stash = HtmlStash::new();
///
/// let out = expander.expand("(c) {% year %} {% unknown %}", &mut stash).unwrap();
/// assert_eq!(out, "(c) 2024 {% unknown %}");
/// ```
pub struct TagExpander {
    config: TagsConfig,
    registry: Arc<TagRegistry>,
    warnings: Vec<String>,
}

impl TagExpander {
    /// Create an expander over a frozen registry.
    #[must_use]
    pub fn new(config: TagsConfig, registry: Arc<TagRegistry>) -> Self {
        Self {
            config,
            registry,
            warnings: Vec::new(),
        }
    }

    /// Configuration passed to handlers.
    #[must_use]
    pub fn config(&self) -> &TagsConfig {
        &self.config
    }

    /// Registry used for tag lookup.
    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Expand all tags in `text`.
    pub fn expand(&mut self, text: &str, stash: &mut dyn Stash) -> Result<String, ExpansionError> {
        let spans = scan(text);
        if spans.is_empty() {
            return Ok(text.to_owned());
        }

        tracing::debug!(count = spans.len(), "Expanding liquid tags");

        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        // Newlines are counted once, from the previous span start onwards.
        let mut line = 1;
        let mut counted = 0;

        for span in &spans {
            output.push_str(&text[last..span.range.start]);
            last = span.range.end;

            line += text[counted..span.range.start].matches('\n').count();
            counted = span.range.start;
            if span.nested {
                self.warnings.push(format!(
                    "line {line}: nested '{{%' inside tag, the tag was closed at the first '%}}'"
                ));
                tracing::warn!(
                    line,
                    markup = %span.markup,
                    "Nested tag delimiters are not supported"
                );
            }

            let Some(name) = span.name else {
                output.push_str(span.markup);
                continue;
            };

            let Some(handler) = self.registry.resolve(name) else {
                tracing::debug!(tag = %name, line, "Leaving unregistered tag unexpanded");
                output.push_str(span.markup);
                continue;
            };

            let mut ctx = TagContext::new(&self.config, stash, line);
            let replacement = handler
                .expand(&mut ctx, name, span.args)
                .map_err(|source| ExpansionError {
                    tag: name.to_owned(),
                    line,
                    source,
                })?;
            output.push_str(&replacement);
        }

        output.push_str(&text[last..]);
        Ok(output)
    }

    /// Expand tags in a document given as lines.
    ///
    /// Lines are joined with `\n` for scanning, so tags may span lines. The
    /// result is split on `\n` again; a handler returning multi-line text
    /// therefore yields additional lines.
    pub fn expand_lines(
        &mut self,
        lines: &[String],
        stash: &mut dyn Stash,
    ) -> Result<Vec<String>, ExpansionError> {
        let page = lines.join("\n");
        let expanded = self.expand(&page, stash)?;
        Ok(expanded.split('\n').map(str::to_owned).collect())
    }

    /// Warnings generated so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Take the warnings generated so far, leaving none behind.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{HtmlStash, TagError, TagHandler};

    fn fixed(value: &'static str) -> impl TagHandler {
        move |_: &mut TagContext<'_>, _: &str, _: &str| -> Result<String, TagError> {
            Ok(value.to_owned())
        }
    }

    fn expander(registry: TagRegistry) -> TagExpander {
        TagExpander::new(TagsConfig::default(), Arc::new(registry))
    }

    fn expand(registry: TagRegistry, text: &str) -> String {
        let mut stash = HtmlStash::new();
        expander(registry).expand(text, &mut stash).unwrap()
    }

    #[test]
    fn test_identity_without_tags() {
        let text = "# Title\n\nSome *markdown* with {braces} and 100% coverage.\n";
        assert_eq!(expand(TagRegistry::new(), text), text);
    }

    #[test]
    fn test_unregistered_tags_unchanged() {
        let text = "a {% video x.mp4 %} b\n{%img  left  pic.png %}\n{%   %}";
        assert_eq!(expand(TagRegistry::new(), text), text);
    }

    #[test]
    fn test_replacement_is_adjacent() {
        let mut registry = TagRegistry::new();
        registry.register("t", fixed("R"));
        assert_eq!(expand(registry, "A{% t x %}B"), "ARB");
    }

    #[test]
    fn test_mixed_registered_and_unknown() {
        let mut registry = TagRegistry::new();
        registry.register("a", fixed("[A]"));

        let out = expand(registry, "{% a %} {% b %} {% a 2 %}");
        assert_eq!(out, "[A] {% b %} [A]");
    }

    #[test]
    fn test_handlers_called_left_to_right() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = TagRegistry::new();
        for name in ["a", "b"] {
            let calls = Arc::clone(&calls);
            registry.register(
                name,
                move |_: &mut TagContext<'_>, tag: &str, markup: &str| -> Result<String, TagError> {
                    calls.lock().unwrap().push(format!("{tag}{markup}"));
                    Ok(tag.to_uppercase())
                },
            );
        }

        let out = expand(registry, "{%b 1%}..{%a 2%}..{%b 3%}");
        assert_eq!(out, "B..A..B");
        assert_eq!(*calls.lock().unwrap(), vec!["b1", "a2", "b3"]);
    }

    #[test]
    fn test_handler_error_aborts_document() {
        let calls = Arc::new(Mutex::new(0));
        let mut registry = TagRegistry::new();
        registry.register(
            "fail",
            |_: &mut TagContext<'_>, _: &str, markup: &str| -> Result<String, TagError> {
                Err(TagError::MalformedTagSyntax {
                    expected: "{% fail %}".to_owned(),
                    markup: markup.to_owned(),
                })
            },
        );
        let counter = Arc::clone(&calls);
        registry.register(
            "count",
            move |_: &mut TagContext<'_>, _: &str, _: &str| -> Result<String, TagError> {
                *counter.lock().unwrap() += 1;
                Ok(String::new())
            },
        );

        let mut stash = HtmlStash::new();
        let err = expander(registry)
            .expand("line one\n{% fail oops %}\n{% count %}", &mut stash)
            .unwrap_err();

        assert_eq!(err.tag, "fail");
        assert_eq!(err.line, 2);
        assert!(matches!(err.source, TagError::MalformedTagSyntax { .. }));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_handler_uses_stash() {
        let mut registry = TagRegistry::new();
        registry.register(
            "html",
            |ctx: &mut TagContext<'_>, _: &str, markup: &str| -> Result<String, TagError> {
                Ok(ctx.stash.store(format!("<b>{markup}</b>"), true))
            },
        );

        let mut stash = HtmlStash::new();
        let out = expander(registry)
            .expand("x {% html bold %} y", &mut stash)
            .unwrap();

        assert_eq!(stash.len(), 1);
        assert_eq!(out, format!("x {} y", stash.placeholder(0)));
    }

    #[test]
    fn test_handler_sees_line_and_config() {
        let mut registry = TagRegistry::new();
        registry.register(
            "where",
            |ctx: &mut TagContext<'_>, _: &str, _: &str| -> Result<String, TagError> {
                Ok(format!("{}@{}", ctx.config.notebook_dir, ctx.line))
            },
        );

        let out = expand(registry, "\n\n{% where %}");
        assert_eq!(out, "\n\nnotebooks@3");
    }

    #[test]
    fn test_line_numbers_across_spans() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let mut registry = TagRegistry::new();
        let seen = Arc::clone(&lines);
        registry.register(
            "at",
            move |ctx: &mut TagContext<'_>, _: &str, _: &str| -> Result<String, TagError> {
                seen.lock().unwrap().push(ctx.line);
                Ok(String::new())
            },
        );

        let text = "{% at %}\n\n{% at\nx %} {% at %}\n{% at %}\n";
        expand(registry, text);

        assert_eq!(*lines.lock().unwrap(), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_nested_delimiters_warn() {
        let mut registry = TagRegistry::new();
        registry.register("a", fixed("A"));

        let mut expander = expander(registry);
        let mut stash = HtmlStash::new();
        let out = expander.expand("{% a {% b %} c %}", &mut stash).unwrap();

        assert_eq!(out, "A c %}");
        assert_eq!(expander.warnings().len(), 1);
        assert!(expander.warnings()[0].contains("nested"));
        assert_eq!(expander.take_warnings().len(), 1);
        assert!(expander.warnings().is_empty());
    }

    #[test]
    fn test_expand_lines_roundtrip_granularity() {
        let lines: Vec<String> = ["# Title", "", "text", ""]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        let mut stash = HtmlStash::new();
        let out = expander(TagRegistry::new())
            .expand_lines(&lines, &mut stash)
            .unwrap();
        assert_eq!(out, lines);
    }

    #[test]
    fn test_expand_lines_multiline_tag() {
        let mut registry = TagRegistry::new();
        registry.register(
            "join",
            |_: &mut TagContext<'_>, _: &str, markup: &str| -> Result<String, TagError> {
                Ok(markup.split_whitespace().collect::<Vec<_>>().join("+"))
            },
        );

        let lines: Vec<String> = ["before {% join", "a", "b %} after"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        let mut stash = HtmlStash::new();
        let out = expander(registry).expand_lines(&lines, &mut stash).unwrap();
        assert_eq!(out, vec!["before a+b after".to_owned()]);
    }

    #[test]
    fn test_expand_lines_multiline_replacement() {
        let mut registry = TagRegistry::new();
        registry.register("two", fixed("first\nsecond"));

        let lines = vec!["{% two %}".to_owned()];
        let mut stash = HtmlStash::new();
        let out = expander(registry).expand_lines(&lines, &mut stash).unwrap();
        assert_eq!(out, vec!["first".to_owned(), "second".to_owned()]);
    }
}
