//! Liquid-style tags: `{% name arguments %}`.
//!
//! # Processing model
//!
//! 1. **Registration**: tag handlers are added to a [`TagRegistry`] during
//!    startup. The registry is then frozen behind an `Arc` and shared.
//! 2. **Scanning** ([`scan`]): every `{% ... %}` span is located left to right.
//!    Matching is lexical; the first `%}` after a `{%` closes the tag.
//! 3. **Expansion** ([`TagExpander`]): each span whose name is registered is
//!    replaced with its handler's output. Unknown tags stay in the text as
//!    written. A failing handler aborts the whole document.
//!
//! [`LiquidTags`] wraps the three steps as a [`Preprocessor`](crate::Preprocessor)
//! for [`MarkdownPipeline`](crate::MarkdownPipeline).

mod config;
mod context;
mod error;
mod expander;
mod extension;
mod registry;
mod scanner;

pub use config::TagsConfig;
pub use context::TagContext;
pub use error::{ExpansionError, TagError};
pub use expander::TagExpander;
pub use extension::LiquidTags;
pub use registry::{TagHandler, TagRegistry};
pub use scanner::{TagSpan, scan};
