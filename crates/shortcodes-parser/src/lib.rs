//! Nested shortcode engine for HTML produced by rich-text editors.
//!
//! Shortcodes are bracket tags such as `[image src="a.png"]` or
//! `[note]...[/note]` embedded in HTML content. [`ShortcodeParser`] replaces
//! them with the output of registered handlers while keeping the document
//! structurally valid.
//!
//! # Architecture
//!
//! Parsing runs as a pipeline over the content:
//! - **Scanner**: lexes shortcode tokens with byte spans and attributes
//! - **Nesting**: pairs open and close tags and orders substitution so nested
//!   shortcodes are processed first
//! - **Rewriter**: replaces each token with a placeholder element
//! - **Repair**: moves or splits around placeholders whose output must sit
//!   outside the enclosing block (see [`Placement`])
//! - **Substitution**: invokes handlers and replaces placeholders with their
//!   output; attribute values are spliced as plain text
//!
//! Every recoverable error goes through one [`ErrorBehavior`].
//!
//! # Example
//!
//! ```
//! use shortcodes_parser::{HandlerOutput, ParserConfig, ShortcodeParser};
//!
//! let mut parser = ShortcodeParser::new(ParserConfig::default());
//! parser.register_fn(
//!     "year",
//!     |_, _| HandlerOutput::html("2026"),
//!     None,
//! );
//!
//! let html = parser.parse("<p>Copyright [year]</p>").unwrap();
//! assert_eq!(html, "<p>Copyright 2026</p>");
//! ```

mod attribute_values;
mod attributes;
mod config;
mod editor;
mod error;
mod handler;
mod nesting;
mod parser;
mod policy;
mod registry;
mod repair;
mod rewriter;
mod scanner;
mod splice;
mod substitute;

pub use attributes::Attributes;
pub use config::{
    DEFAULT_BLOCK_ELEMENTS, DEFAULT_MARKER_CLASS, ErrorBehavior, ParserConfig, Placement,
    PlacementRules,
};
pub use error::{ShortcodeError, UnknownErrorBehavior};
pub use handler::{HandlerContext, HandlerOutput, ShortcodeCall, ShortcodeHandler, ShortcodeSite};
pub use parser::{Analysis, ShortcodeParser};
pub use policy::warning_html;
pub use registry::{ExpectedResult, ShortcodeOptions, is_valid_name};
pub use scanner::{Escape, MarkerKind, Token, TokenKind};
