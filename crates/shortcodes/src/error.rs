//! CLI error types.

use shortcodes_config::ConfigError;
use shortcodes_parser::ShortcodeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Shortcode(#[from] ShortcodeError),
}
