//! Subcommand implementations

pub mod languages;
pub mod preview;
pub mod render;

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use snipprok::Theme;

use crate::cli::SourceArgs;

/// Snippet text from the input file, or stdin
pub fn read_source(args: &SourceArgs) -> Result<String> {
    match &args.input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        },
    }
}

/// The theme file, or the built-in dark theme
pub fn load_theme(args: &SourceArgs) -> Result<Theme> {
    match &args.theme {
        Some(path) => Theme::from_file(path)
            .with_context(|| format!("Failed to load theme {}", path.display())),
        None => Ok(Theme::dark()),
    }
}
