//! Shortcodes CLI - shortcode engine for editor HTML.
//!
//! Provides commands for:
//! - `render`: Substitute shortcodes in an HTML file
//! - `tokens`: List the shortcode tokens found in an HTML file

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, TokensArgs};
use output::Output;

/// Shortcodes - shortcode engine for editor HTML.
#[derive(Parser)]
#[command(name = "shortcodes", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Substitute shortcodes using templates from the configuration.
    Render(RenderArgs),
    /// Print scanned tokens and their processing order.
    Tokens(TokensArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Tokens(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
