//! CLI argument definitions using Clap v4

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Snipprok - turn code snippets into PNG cards
#[derive(Parser, Debug)]
#[command(name = "snipprok")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a snippet as a PNG card
    #[command(alias = "r")]
    Render(RenderArgs),

    /// Print the snippet highlighted in the terminal
    #[command(alias = "p")]
    Preview(PreviewArgs),

    /// List supported languages and their aliases
    Languages,
}

/// Where the snippet comes from and how it is tokenized
#[derive(Parser, Debug, Clone)]
pub struct SourceArgs {
    /// Source file (reads stdin if omitted or `-`)
    pub input: Option<PathBuf>,

    /// Language tag, e.g. rust, ts, yml
    #[arg(short, long, default_value = "plain")]
    pub language: String,

    /// Theme JSON file (built-in dark theme if omitted)
    #[arg(long)]
    pub theme: Option<PathBuf>,
}

/// Arguments for the render command
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Font size in pixels (8-48)
    #[arg(short = 's', long, default_value = "14")]
    pub font_size: String,

    /// Padding around the panel in pixels (0-96)
    #[arg(short, long, default_value = "32")]
    pub padding: String,

    /// Card width in pixels (320-1600)
    #[arg(short, long, default_value = "640")]
    pub width: String,

    /// Pixel density multiplier
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub scale: u32,

    /// Card background, any CSS color
    #[arg(short, long, default_value = "#0b0b0f")]
    pub background: String,

    /// Directory the PNG is saved to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Font file tried before the bundled font (repeatable)
    #[arg(long = "font")]
    pub fonts: Vec<PathBuf>,

    /// Fall back to the system monospace font after the remote mirrors
    #[arg(long)]
    pub system_font: bool,
}

/// Arguments for the preview command
#[derive(Parser, Debug, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => unreachable!("{e}"),
        }
    }

    #[test]
    fn test_render_defaults() {
        let cli = parse(&["snipprok", "render", "main.rs", "-l", "rust"]);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.source.input, Some(PathBuf::from("main.rs")));
                assert_eq!(args.source.language, "rust");
                assert_eq!(args.font_size, "14");
                assert_eq!(args.padding, "32");
                assert_eq!(args.width, "640");
                assert_eq!(args.scale, 1);
                assert!(args.fonts.is_empty());
                assert!(!args.system_font);
            },
            other => unreachable!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn test_scale_is_limited_to_three() {
        assert!(Cli::try_parse_from(["snipprok", "render", "--scale", "4"]).is_err());
        assert!(Cli::try_parse_from(["snipprok", "render", "--scale", "0"]).is_err());
        assert!(Cli::try_parse_from(["snipprok", "render", "--scale", "3"]).is_ok());
    }

    #[test]
    fn test_fonts_repeat_in_order() {
        let cli = parse(&["snipprok", "render", "--font", "a.ttf", "--font", "b.ttf"]);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.fonts, vec![PathBuf::from("a.ttf"), PathBuf::from("b.ttf")]);
            },
            other => unreachable!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = parse(&["snipprok", "languages", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Languages));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
