//! `shortcodes tokens` command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use shortcodes_config::Config;
use shortcodes_parser::{Analysis, Token};

use super::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tokens command.
#[derive(Args)]
pub(crate) struct TokensArgs {
    /// HTML file to analyze (default: stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover shortcodes.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TokensArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let parser = config.build_parser();
        let content = read_input(self.input.as_deref())?;
        let analysis = parser.analyze(&content)?;

        output.highlight(&format!("{} token(s)", analysis.tokens.len()));
        output.data(&format_analysis(&analysis))?;
        Ok(())
    }
}

/// One line per token followed by the processing order.
fn format_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    for token in &analysis.tokens {
        out.push_str(&format_token(token));
        out.push('\n');
    }
    let order: Vec<String> = analysis.order.iter().map(ToString::to_string).collect();
    let _ = writeln!(out, "order: {}", order.join(", "));
    out
}

fn format_token(token: &Token) -> String {
    let kind = if token.is_open() { "open" } else { "close" };
    let mut line = format!(
        "{:>3} {}..{} {kind} {} {}",
        token.index, token.start, token.end, token.name, token.marker
    );
    for (name, value) in token.attrs.iter() {
        let _ = write!(line, " {name}={value:?}");
    }
    if let Some(counterpart) = token.counterpart {
        let _ = write!(line, " -> {counterpart}");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shortcodes_parser::{HandlerOutput, ParserConfig, ShortcodeOptions, ShortcodeParser};

    #[test]
    fn test_format_analysis() {
        let mut parser = ShortcodeParser::new(ParserConfig::default());
        parser
            .register_fn("box", |_, _| HandlerOutput::html(""), Some(ShortcodeOptions::new().paired()))
            .register_fn("img", |_, _| HandlerOutput::html(""), None);

        let analysis = parser.analyze(r#"[box][img src="a.png"][/box]"#).unwrap();

        assert_eq!(
            format_analysis(&analysis),
            "  0 0..5 open box inline -> 2\n  \
             1 5..22 open img inline src=\"a.png\"\n  \
             2 22..28 close box inline -> 0\n\
             order: 1, 0\n"
        );
    }
}
