//! Notebook to HTML conversion.
//!
//! [`HtmlExporter`] reads nbformat v4 documents and renders the selected cells
//! as static HTML. Code cells are highlighted in the notebook's language and
//! the theme stylesheet is returned with the other resources.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use lq_renderer::{TagError, escape_html};
use pulldown_cmark::{Options, Parser, html};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::CellRange;
use crate::highlight;

/// Language used when neither the tag nor the notebook names one.
pub const DEFAULT_LANGUAGE: &str = "ipython";

/// Class of the element wrapping highlighted code.
pub const HIGHLIGHT_CLASS: &str = "highlight-ipynb";

const BASE_CSS: &str = include_str!("../assets/notebook.css");

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());

/// HTML produced for a notebook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedNotebook {
    /// HTML body for the selected cells.
    pub body: String,
    /// Stylesheets the body depends on.
    pub css: Vec<String>,
}

/// Converts a notebook file to HTML.
pub trait NotebookRenderer: Send + Sync {
    /// Render the cells of `path` selected by `cells`.
    ///
    /// `language` overrides the highlighting language recorded in the notebook.
    fn render(
        &self,
        path: &Path,
        cells: CellRange,
        language: Option<&str>,
    ) -> Result<RenderedNotebook, TagError>;
}

/// Built-in nbformat v4 renderer.
#[derive(Clone, Debug)]
pub struct HtmlExporter {
    gfm: bool,
}

impl HtmlExporter {
    /// Create an exporter with GFM markdown cells.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown in markdown cells.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Render notebook JSON that has already been read.
    pub fn render_str(
        &self,
        source: &str,
        cells: CellRange,
        language: Option<&str>,
    ) -> Result<RenderedNotebook, String> {
        let notebook: Notebook = serde_json::from_str(source).map_err(|e| e.to_string())?;
        if notebook.nbformat != 4 {
            return Err(format!(
                "unsupported nbformat version {}, expected 4",
                notebook.nbformat
            ));
        }

        let language = language
            .or_else(|| notebook.metadata.language())
            .unwrap_or(DEFAULT_LANGUAGE);

        let mut body = String::new();
        for cell in cells.slice(&notebook.cells) {
            self.render_cell(&mut body, cell, language);
        }

        let mut css = vec![BASE_CSS.to_owned()];
        css.extend(highlight::stylesheet().map(str::to_owned));

        Ok(RenderedNotebook { body, css })
    }

    fn render_cell(&self, out: &mut String, cell: &Cell, language: &str) {
        match cell {
            Cell::Markdown { source } => {
                out.push_str("<div class=\"nb-cell nb-markdown-cell\">\n");
                out.push_str(&self.markdown(source));
                out.push_str("</div>\n");
            }
            Cell::Code {
                source,
                execution_count,
                outputs,
            } => {
                out.push_str("<div class=\"nb-cell nb-code-cell\">\n");
                writeln!(
                    out,
                    "<div class=\"nb-input\">{}<div class=\"{HIGHLIGHT_CLASS}\">\
                     <pre class=\"ipynb\"><code class=\"language-{}\">{}</code></pre></div></div>",
                    prompt("In", *execution_count),
                    escape_html(language),
                    highlight::highlight(source.trim_end_matches('\n'), language),
                )
                .unwrap();
                for output in outputs {
                    self.render_output(out, output);
                }
                out.push_str("</div>\n");
            }
            Cell::Raw { source, metadata } => {
                if metadata.format.as_deref() == Some("text/html") {
                    out.push_str("<div class=\"nb-cell nb-raw-cell\">\n");
                    out.push_str(source);
                    out.push_str("\n</div>\n");
                }
            }
        }
    }

    fn render_output(&self, out: &mut String, output: &CellOutput) {
        let (prompt_html, class, content) = match output {
            CellOutput::Stream { name, text } => {
                let class = if name == "stderr" {
                    "nb-stream nb-stderr"
                } else {
                    "nb-stream"
                };
                (
                    prompt_placeholder(),
                    class,
                    format!("<pre>{}</pre>", escape_html(text)),
                )
            }
            CellOutput::ExecuteResult {
                data,
                execution_count,
            } => (
                prompt("Out", *execution_count),
                "nb-result",
                self.mime_bundle(data),
            ),
            CellOutput::DisplayData { data } => {
                (prompt_placeholder(), "nb-display", self.mime_bundle(data))
            }
            CellOutput::Error {
                ename,
                evalue,
                traceback,
            } => {
                let text = if traceback.is_empty() {
                    format!("{ename}: {evalue}")
                } else {
                    ANSI_ESCAPE
                        .replace_all(&traceback.join("\n"), "")
                        .into_owned()
                };
                (
                    prompt_placeholder(),
                    "nb-error",
                    format!("<pre>{}</pre>", escape_html(&text)),
                )
            }
        };

        writeln!(
            out,
            "<div class=\"nb-output\">{prompt_html}<div class=\"nb-output-area {class}\">{content}</div></div>"
        )
        .unwrap();
    }

    /// Pick the richest representation in a MIME bundle.
    fn mime_bundle(&self, data: &BTreeMap<String, Value>) -> String {
        if let Some(html) = mime_text(data, "text/html") {
            return html;
        }
        if let Some(svg) = mime_text(data, "image/svg+xml") {
            return svg;
        }
        for mime in ["image/png", "image/jpeg"] {
            if let Some(encoded) = mime_text(data, mime) {
                let encoded: String = encoded.split_whitespace().collect();
                return format!("<img src=\"data:{mime};base64,{encoded}\" alt=\"output\">");
            }
        }
        if let Some(markdown) = mime_text(data, "text/markdown") {
            return self.markdown(&markdown);
        }
        if let Some(text) = mime_text(data, "text/plain") {
            return format!("<pre>{}</pre>", escape_html(&text));
        }
        String::new()
    }

    fn markdown(&self, source: &str) -> String {
        let options = if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        };
        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, Parser::new_ext(source, options));
        output
    }
}

impl Default for HtmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotebookRenderer for HtmlExporter {
    fn render(
        &self,
        path: &Path,
        cells: CellRange,
        language: Option<&str>,
    ) -> Result<RenderedNotebook, TagError> {
        let source = fs::read_to_string(path)?;
        self.render_str(&source, cells, language)
            .map_err(|message| TagError::Render {
                path: path.to_path_buf(),
                message,
            })
    }
}

fn prompt(label: &str, count: Option<u64>) -> String {
    let count = count.map_or_else(|| "&nbsp;".to_owned(), |n| n.to_string());
    format!("<div class=\"nb-prompt\">{label}&nbsp;[{count}]:</div>")
}

fn prompt_placeholder() -> String {
    "<div class=\"nb-prompt\"></div>".to_owned()
}

/// Text of a MIME bundle entry stored as a string or a list of lines.
fn mime_text(data: &BTreeMap<String, Value>, mime: &str) -> Option<String> {
    match data.get(mime)? {
        Value::String(text) => Some(text.clone()),
        Value::Array(lines) => Some(lines.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct Notebook {
    nbformat: u32,
    #[serde(default)]
    metadata: NotebookMetadata,
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Default, Deserialize)]
struct NotebookMetadata {
    language_info: Option<LanguageInfo>,
    kernelspec: Option<KernelSpec>,
}

impl NotebookMetadata {
    fn language(&self) -> Option<&str> {
        self.language_info
            .as_ref()
            .map(|info| info.name.as_str())
            .or_else(|| self.kernelspec.as_ref()?.language.as_deref())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct LanguageInfo {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct KernelSpec {
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum Cell {
    Markdown {
        #[serde(deserialize_with = "multiline")]
        source: String,
    },
    Code {
        #[serde(deserialize_with = "multiline")]
        source: String,
        execution_count: Option<u64>,
        #[serde(default)]
        outputs: Vec<CellOutput>,
    },
    Raw {
        #[serde(deserialize_with = "multiline")]
        source: String,
        #[serde(default)]
        metadata: RawMetadata,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(alias = "raw_mimetype")]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
enum CellOutput {
    Stream {
        #[serde(default)]
        name: String,
        #[serde(deserialize_with = "multiline")]
        text: String,
    },
    ExecuteResult {
        #[serde(default)]
        data: BTreeMap<String, Value>,
        execution_count: Option<u64>,
    },
    DisplayData {
        #[serde(default)]
        data: BTreeMap<String, Value>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

/// nbformat stores text either as one string or as a list of lines.
fn multiline<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        One(String),
        Lines(Vec<String>),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::One(text) => text,
        Text::Lines(lines) => lines.concat(),
    })
}
