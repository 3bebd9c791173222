//! Tag syntax scanning.
//!
//! Locates `{% ... %}` spans. Matching is purely lexical: a span runs from a
//! `{%` to the first `%}` after it, across newlines. Nested delimiters are not
//! understood, so `{% a {% b %} c %}` closes after `b` and leaves ` c %}` as
//! plain text. Such spans are flagged with [`TagSpan::nested`].

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

const OPEN: &str = "{%";
const CLOSE: &str = "%}";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{%.*?%\}").unwrap());

/// A located `{% ... %}` occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSpan<'a> {
    /// Byte range of the span in the scanned text, delimiters included.
    pub range: Range<usize>,
    /// Full matched text, delimiters included.
    pub markup: &'a str,
    /// First whitespace-delimited token of the body.
    ///
    /// `None` when the body is blank; such spans are never expanded.
    pub name: Option<&'a str>,
    /// Body after the name, with surrounding whitespace removed.
    pub args: &'a str,
    /// The body contains another `{%`.
    pub nested: bool,
}

impl TagSpan<'_> {
    /// Line of the opening `{%` within `text` (1-indexed).
    #[must_use]
    pub fn line(&self, text: &str) -> usize {
        text[..self.range.start].matches('\n').count() + 1
    }
}

/// Find every tag span in `text`, left to right.
///
/// # Example
///
/// ```
/// use lq_renderer::scan;
///
/// let spans = scan("Intro {% notebook demo.ipynb cells[1:3] %} outro");
/// assert_eq!(spans.len(), 1);
/// assert_eq!(spans[0].name, Some("notebook"));
/// assert_eq!(spans[0].args, "demo.ipynb cells[1:3]");
/// assert_eq!(spans[0].range, 6..42);
/// ```
#[must_use]
pub fn scan(text: &str) -> Vec<TagSpan<'_>> {
    TAG_RE
        .find_iter(text)
        .map(|m| {
            let markup = m.as_str();
            let body = &markup[OPEN.len()..markup.len() - CLOSE.len()];
            let (name, args) = split_name(body);
            TagSpan {
                range: m.range(),
                markup,
                name,
                args,
                nested: body.contains(OPEN),
            }
        })
        .collect()
}

/// Split a tag body into its leading token and the remaining argument text.
fn split_name(body: &str) -> (Option<&str>, &str) {
    let body = body.trim_start();
    if body.is_empty() {
        return (None, "");
    }

    match body.find(char::is_whitespace) {
        Some(end) => (Some(&body[..end]), body[end..].trim()),
        None => (Some(body), ""),
    }
}
