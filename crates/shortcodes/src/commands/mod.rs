//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod tokens;

use std::io::Read;
use std::path::Path;

pub(crate) use render::RenderArgs;
pub(crate) use tokens::TokensArgs;

use crate::error::CliError;

/// Read HTML from a file, or from stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}
