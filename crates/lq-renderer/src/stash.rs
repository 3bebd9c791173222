//! Placeholder store for pre-rendered HTML.
//!
//! Tag handlers produce HTML that must not be touched by the markdown parser.
//! The fragment is stored here and a short opaque token is put into the
//! markdown instead; after rendering, tokens are swapped back for fragments.

use crate::Replacements;

const TOKEN_START: char = '\u{2}';
const TOKEN_END: char = '\u{3}';

/// Write access to a placeholder store.
pub trait Stash {
    /// Store `content` and return the token that stands in for it.
    ///
    /// `safe` content is restored verbatim; anything else is HTML-escaped.
    fn store(&mut self, content: String, safe: bool) -> String;
}

/// In-memory [`Stash`] used by [`MarkdownPipeline`](crate::MarkdownPipeline).
///
/// Tokens have the form `\u{2}lqstash:N\u{3}`. The control characters pass
/// through pulldown-cmark untouched and never occur in ordinary prose.
#[derive(Debug, Default)]
pub struct HtmlStash {
    items: Vec<(String, bool)>,
}

impl HtmlStash {
    /// Create an empty stash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for the fragment at `index`.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        format!("{TOKEN_START}lqstash:{index}{TOKEN_END}")
    }

    /// Number of stored fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Build the substitutions that restore every stored fragment.
    ///
    /// A token that is the only content of a paragraph replaces the whole
    /// `<p>...</p>` element so block-level fragments are not wrapped in `<p>`.
    #[must_use]
    pub fn into_replacements(self) -> Replacements {
        let mut replacements = Replacements::with_capacity(self.items.len() * 2);
        for (index, (content, safe)) in self.items.into_iter().enumerate() {
            let token = format!("{TOKEN_START}lqstash:{index}{TOKEN_END}");
            let fragment = if safe { content } else { escape_html(&content) };
            replacements.add(format!("<p>{token}</p>"), fragment.clone());
            replacements.add(token, fragment);
        }
        replacements
    }

    /// Replace every token in `html` with its fragment.
    pub fn restore(self, html: &mut String) {
        self.into_replacements().apply(html);
    }
}

impl Stash for HtmlStash {
    fn store(&mut self, content: String, safe: bool) -> String {
        let token = self.placeholder(self.items.len());
        self.items.push((content, safe));
        token
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_tokens_are_distinct() {
        let mut stash = HtmlStash::new();
        let first = stash.store("<hr>".to_owned(), true);
        let second = stash.store("<hr>".to_owned(), true);

        assert_ne!(first, second);
        assert_eq!(stash.len(), 2);
        assert_eq!(second, stash.placeholder(1));
    }

    #[test]
    fn test_restore_safe_fragment() {
        let mut stash = HtmlStash::new();
        let token = stash.store("<video src=\"a.mp4\"></video>".to_owned(), true);

        let mut html = format!("<p>watch {token} now</p>\n");
        stash.restore(&mut html);
        assert_eq!(html, "<p>watch <video src=\"a.mp4\"></video> now</p>\n");
    }

    #[test]
    fn test_restore_unsafe_fragment_escaped() {
        let mut stash = HtmlStash::new();
        let token = stash.store("<b>&</b>".to_owned(), false);

        let mut html = format!("<p>{token}</p>");
        stash.restore(&mut html);
        assert_eq!(html, "&lt;b&gt;&amp;&lt;/b&gt;");
    }

    #[test]
    fn test_paragraph_wrapper_removed() {
        let mut stash = HtmlStash::new();
        let token = stash.store("<div>block</div>".to_owned(), true);

        let mut html = format!("<h1>T</h1>\n<p>{token}</p>\n");
        stash.restore(&mut html);
        assert_eq!(html, "<h1>T</h1>\n<div>block</div>\n");
    }

    #[test]
    fn test_ten_tokens_do_not_collide() {
        let mut stash = HtmlStash::new();
        let tokens: Vec<String> = (0..11)
            .map(|i| stash.store(format!("[{i}]"), true))
            .collect();

        let mut html = format!("{} {}", tokens[1], tokens[10]);
        stash.restore(&mut html);
        assert_eq!(html, "[1] [10]");
    }

    #[test]
    fn test_empty_stash() {
        let stash = HtmlStash::new();
        assert!(stash.is_empty());
        assert!(stash.into_replacements().is_empty());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }
}
