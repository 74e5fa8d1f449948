//! Configuration management for the shortcode engine.
//!
//! Parses `shortcodes.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [parser]
//! error_behavior = "warn"
//! marker_class = "--ss-shortcode-marker"
//!
//! [parser.placement]
//! split = ["center", "leftAlone"]
//!
//! [shortcodes.note]
//! template = "<aside>{{ content }}</aside>"
//! has_start_and_end = true
//! expected_result = "block"
//! ```

mod template;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use shortcodes_parser::{ErrorBehavior, ParserConfig, ShortcodeParser, is_valid_name};

pub use template::{TemplateHandler, TemplateShortcode};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override error behavior.
    pub error_behavior: Option<ErrorBehavior>,
    /// Override placeholder class.
    pub marker_class: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "shortcodes.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine configuration.
    pub parser: ParserConfig,
    /// Template shortcodes keyed by name.
    pub shortcodes: BTreeMap<String, TemplateShortcode>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `shortcodes.toml` in current directory and
    /// parents, falling back to defaults.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(behavior) = settings.error_behavior {
            self.parser.error_behavior = behavior;
        }
        if let Some(marker_class) = &settings.marker_class {
            self.parser.marker_class.clone_from(marker_class);
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), shortcodes = config.shortcodes.len(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_parser()?;
        self.validate_shortcodes()?;
        Ok(())
    }

    fn validate_parser(&self) -> Result<(), ConfigError> {
        let class = &self.parser.marker_class;
        if class.is_empty() {
            return Err(ConfigError::Validation(
                "parser.marker_class cannot be empty".to_owned(),
            ));
        }
        if !class
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ConfigError::Validation(format!(
                "parser.marker_class '{class}' may only contain letters, digits, '-' and '_'"
            )));
        }
        if let Some(name) = self.parser.block_elements.iter().find(|e| e.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "parser.block_elements contains an empty name: {name:?}"
            )));
        }
        Ok(())
    }

    fn validate_shortcodes(&self) -> Result<(), ConfigError> {
        for (name, shortcode) in &self.shortcodes {
            if !is_valid_name(name) {
                return Err(ConfigError::Validation(format!(
                    "shortcodes.{name}: name may only contain letters, digits and '_'"
                )));
            }
            if shortcode.template.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "shortcodes.{name}.template cannot be empty"
                )));
            }
        }
        Ok(())
    }

    /// Build a parser with every template shortcode registered.
    #[must_use]
    pub fn build_parser(&self) -> ShortcodeParser {
        let mut parser = ShortcodeParser::new(self.parser.clone());
        self.register_templates(&mut parser);
        parser
    }

    /// Register template shortcodes on an existing parser.
    pub fn register_templates(&self, parser: &mut ShortcodeParser) {
        for (name, shortcode) in &self.shortcodes {
            parser.register(name, shortcode.handler(), Some(shortcode.options()));
        }
    }
}

/// Search for a config file in `start` and its parents.
#[must_use]
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
