//! Error policy: turns a recoverable error into replacement text.

use crate::config::ErrorBehavior;
use crate::error::ShortcodeError;

/// Wrap a message in the visible warning fragment.
#[must_use]
pub fn warning_html(body: &str) -> String {
    format!(r#"<strong class="warning">{body}</strong>"#)
}

/// Replacement for a shortcode that could not be resolved to a handler
/// result: unregistered tags and handlers reporting `Unknown`.
///
/// `source` is the original text kept by `leave`. `warn` embeds the tag text;
/// where markup is not allowed it falls back to `source`.
pub(crate) fn unresolved(
    behavior: ErrorBehavior,
    error: ShortcodeError,
    tag: &str,
    source: &str,
    allow_html: bool,
) -> Result<String, ShortcodeError> {
    log_decision(behavior, &error);
    match behavior {
        ErrorBehavior::Strip => Ok(String::new()),
        ErrorBehavior::Warn if allow_html => Ok(warning_html(tag)),
        ErrorBehavior::Warn | ErrorBehavior::Leave => Ok(source.to_owned()),
        ErrorBehavior::Fail => Err(error),
    }
}

/// Replacement for a structural error (unexpected, mismatched or unclosed
/// tags, impossible placement). `warn` embeds the error message.
pub(crate) fn structural(
    behavior: ErrorBehavior,
    error: ShortcodeError,
    source: &str,
    allow_html: bool,
) -> Result<String, ShortcodeError> {
    log_decision(behavior, &error);
    match behavior {
        ErrorBehavior::Strip => Ok(String::new()),
        ErrorBehavior::Warn if allow_html => Ok(warning_html(&error.to_string())),
        ErrorBehavior::Warn | ErrorBehavior::Leave => Ok(source.to_owned()),
        ErrorBehavior::Fail => Err(error),
    }
}

fn log_decision(behavior: ErrorBehavior, error: &ShortcodeError) {
    tracing::warn!(behavior = %behavior, error = %error, "Shortcode error");
}
