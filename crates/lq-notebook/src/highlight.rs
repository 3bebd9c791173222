//! Syntax highlighting for code cells.
//!
//! Code is tokenized with syntect and emitted as `<span>`s carrying
//! [`CLASS_PREFIX`]ed scope classes. The matching theme stylesheet is nested
//! under `.highlight-ipynb`, so it only applies inside highlighted blocks once
//! the LESS compiler flattens it.

use std::sync::LazyLock;

use lq_renderer::escape_html;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::exporter::HIGHLIGHT_CLASS;

/// Prefix applied to every scope class in highlighted output.
pub const CLASS_PREFIX: &str = "hl-";

/// Bundled syntect theme the stylesheet is generated from.
pub const THEME: &str = "InspiredGitHub";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed {
    prefix: CLASS_PREFIX,
};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

static STYLESHEET: LazyLock<Option<String>> = LazyLock::new(|| {
    let themes = ThemeSet::load_defaults();
    let Some(theme) = themes.themes.get(THEME) else {
        tracing::warn!(theme = THEME, "Highlight theme missing, code cells unstyled");
        return None;
    };
    match css_for_theme_with_class_style(theme, CLASS_STYLE) {
        Ok(css) => Some(format!(".{HIGHLIGHT_CLASS} {{\n{css}}}\n")),
        Err(err) => {
            tracing::warn!(theme = THEME, error = %err, "Failed to build highlight CSS");
            None
        }
    }
});

/// Highlight `code` as `language`, returning escaped HTML.
///
/// Unknown languages are emitted as plain text. A tokenizer failure falls
/// back to the escaped source rather than failing the notebook.
pub fn highlight(code: &str, language: &str) -> String {
    let syntax = resolve_syntax(language);
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(language, error = %err, "Highlighting failed, using plain text");
            return escape_html(code);
        }
    }
    generator.finalize()
}

/// Theme stylesheet for highlighted code, nested under the highlight class.
pub fn stylesheet() -> Option<&'static str> {
    STYLESHEET.as_deref()
}

/// Map a notebook language name onto a bundled syntax.
///
/// Kernel names like `ipython3` or `python2` resolve to their base language.
fn resolve_syntax(language: &str) -> &'static SyntaxReference {
    let set: &'static SyntaxSet = &SYNTAX_SET;
    let base = match language.trim_end_matches(|c: char| c.is_ascii_digit()) {
        "ipython" => "python",
        other => other,
    };
    set.find_syntax_by_token(language)
        .or_else(|| set.find_syntax_by_token(base))
        .unwrap_or_else(|| set.find_syntax_plain_text())
}
