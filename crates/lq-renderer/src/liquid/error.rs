//! Tag handler errors.

use std::path::PathBuf;

/// Error returned by a tag handler.
///
/// Every variant is fatal for the document being processed. Unregistered tags
/// are not errors: they are left in the output unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// Tag arguments do not match the handler's grammar.
    #[error("Malformed tag '{markup}', expected syntax: {expected}")]
    MalformedTagSyntax {
        /// Syntax the handler accepts.
        expected: String,
        /// Argument text as written in the document.
        markup: String,
    },
    /// Referenced source document does not exist.
    #[error("File {} could not be found", .0.display())]
    SourceNotFound(PathBuf),
    /// Converting the referenced document failed.
    #[error("Failed to render {}: {message}", path.display())]
    Render {
        /// Document being converted.
        path: PathBuf,
        /// Underlying cause.
        message: String,
    },
    /// External CSS compiler is missing or failed on every attempt.
    #[error(
        "Failed to process CSS with '{tool}': {detail}. Is {tool} installed? \
         Specifically, can you run \"{tool} --version\"?"
    )]
    CssCompilationFailed {
        /// Compiler executable name.
        tool: String,
        /// What went wrong on the last attempt.
        detail: String,
    },
    /// Unexpected I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A handler failure located in the source document.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: tag '{tag}' failed: {source}")]
pub struct ExpansionError {
    /// Name of the tag whose handler failed.
    pub tag: String,
    /// Line of the opening `{%` (1-indexed).
    pub line: usize,
    /// Handler error.
    #[source]
    pub source: TagError,
}
