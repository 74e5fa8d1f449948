//! Error types for the shortcode engine.

use shortcodes_html::HtmlError;

use crate::config::Placement;

/// Error raised while processing shortcodes.
///
/// Every variant except [`InvalidTree`](Self::InvalidTree) is first routed
/// through the configured [`ErrorBehavior`](crate::ErrorBehavior); it only
/// reaches the caller in `fail` mode.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShortcodeError {
    /// No handler is registered for a non-numeric shortcode.
    #[error("unknown shortcode tag {name}")]
    UnresolvedTag { name: String },

    /// Close tag of a registered shortcode with nothing open.
    #[error("didn't expect close of {name}")]
    UnexpectedClose { name: String },

    /// Close tag that does not match the innermost open shortcode.
    #[error("mismatching end shortcode, expected {expected} but got {found}")]
    MismatchedClose { expected: String, found: String },

    /// Paired shortcode never closed before the end of the content.
    #[error("shortcode {name} is never closed")]
    UnclosedTag { name: String },

    /// Handler declined to render the shortcode.
    #[error("shortcode handler for {name} could not render it")]
    HandlerUnknown { name: String },

    /// Shortcode needs a block ancestor to move around but has none.
    #[error("no block ancestor for shortcode {name} with {placement} placement")]
    InvalidPlacement { name: String, placement: Placement },

    /// Rewritten content could not be parsed into a tree.
    #[error("couldn't decode HTML when processing shortcodes: {0}")]
    InvalidTree(#[from] HtmlError),
}

/// Error returned when parsing an unknown error behavior name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error behavior '{0}' (expected strip, warn, leave or fail)")]
pub struct UnknownErrorBehavior(pub String);
