//! `shortcodes render` command implementation.

use std::path::PathBuf;

use clap::Args;
use shortcodes_config::{CliSettings, Config};
use shortcodes_parser::ErrorBehavior;

use super::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// HTML file to render (default: stdin).
    input: Option<PathBuf>,

    /// Write the result to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover shortcodes.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Error behavior: strip, warn, leave or fail (overrides config).
    #[arg(long)]
    error_behavior: Option<ErrorBehavior>,

    /// Placeholder class used during processing (overrides config).
    #[arg(long)]
    marker_class: Option<String>,

    /// Enable verbose output (debug level logging).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            error_behavior: self.error_behavior,
            marker_class: self.marker_class.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }

        let parser = config.build_parser();
        let content = read_input(self.input.as_deref())?;
        let html = parser.parse(&content)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                output.success(&format!("Rendered to {}", path.display()));
            }
            None => output.data(&html)?,
        }
        Ok(())
    }
}
