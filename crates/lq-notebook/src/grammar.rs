//! Notebook tag arguments: `path [cells[start:end]] [language[lang]]`.

use std::num::IntErrorKind;
use std::ops::Range;
use std::sync::LazyLock;

use lq_renderer::TagError;
use regex::Regex;

/// Syntax reported when the arguments cannot be parsed.
pub const SYNTAX: &str =
    "{% notebook /path/to/notebook.ipynb [ cells[start:end] ] [ language[language] ] %}";

static FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\s+)?(?P<src>\S+)(\s+)?((cells\[)(?P<start>-?[0-9]*):(?P<end>-?[0-9]*)(\]))?(\s+)?((language\[)(?P<language>-?[a-z0-9\+\-]*)(\]))?(\s+)?$",
    )
    .unwrap()
});

/// Half-open selection of notebook cells.
///
/// Indices behave like sequence slices: negative values count from the end
/// and out-of-range values are clamped, so a range never fails to apply.
///
/// ```
/// use lq_notebook::CellRange;
///
/// let cells = ["a", "b", "c", "d"];
/// assert_eq!(CellRange::new(1, Some(3)).slice(&cells), ["b", "c"]);
/// assert_eq!(CellRange::new(-2, None).slice(&cells), ["c", "d"]);
/// assert_eq!(CellRange::new(0, Some(-1)).slice(&cells), ["a", "b", "c"]);
/// assert!(CellRange::new(3, Some(1)).slice(&cells).is_empty());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    /// First cell, inclusive.
    pub start: i64,
    /// End cell, exclusive. `None` runs to the last cell.
    pub end: Option<i64>,
}

impl CellRange {
    /// Every cell.
    pub const ALL: Self = Self {
        start: 0,
        end: None,
    };

    /// Create a range.
    #[must_use]
    pub fn new(start: i64, end: Option<i64>) -> Self {
        Self { start, end }
    }

    /// Concrete index range for a sequence of `len` items.
    #[must_use]
    pub fn bounds(&self, len: usize) -> Range<usize> {
        let start = clamp(self.start, len);
        let end = self.end.map_or(len, |end| clamp(end, len));
        start..end.max(start)
    }

    /// Apply the range to `items`.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.bounds(items.len())]
    }
}

impl Default for CellRange {
    fn default() -> Self {
        Self::ALL
    }
}

fn clamp(index: i64, len: usize) -> usize {
    let len_signed = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 {
        (index + len_signed).max(0)
    } else {
        index.min(len_signed)
    };
    usize::try_from(resolved).unwrap_or(0)
}

/// Parsed notebook tag arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotebookArgs {
    /// Notebook path relative to the notebook directory.
    pub src: String,
    /// Cells to include.
    pub cells: CellRange,
    /// Highlighting language; `None` uses the notebook's own language.
    pub language: Option<String>,
}

/// Parse the argument text of a `notebook` tag.
pub fn parse(markup: &str) -> Result<NotebookArgs, TagError> {
    let malformed = || TagError::MalformedTagSyntax {
        expected: SYNTAX.to_owned(),
        markup: markup.to_owned(),
    };

    let caps = FORMAT.captures(markup).ok_or_else(malformed)?;

    let index = |name: &str| -> Result<Option<i64>, TagError> {
        match caps.name(name).as_ref().map(regex::Match::as_str) {
            None | Some("") => Ok(None),
            Some(value) => match value.parse::<i64>() {
                Ok(n) => Ok(Some(n)),
                // Out-of-range indices clamp during slicing anyway.
                Err(err) => match err.kind() {
                    IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
                    IntErrorKind::NegOverflow => Ok(Some(i64::MIN)),
                    _ => Err(malformed()),
                },
            },
        }
    };

    let start = index("start")?.unwrap_or(0);
    let end = index("end")?;

    let language = caps
        .name("language")
        .as_ref()
        .map(regex::Match::as_str)
        .filter(|lang| !lang.is_empty())
        .map(str::to_owned);

    Ok(NotebookArgs {
        src: caps["src"].to_owned(),
        cells: CellRange::new(start, end),
        language,
    })
}
