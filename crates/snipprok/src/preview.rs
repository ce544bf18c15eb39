//! Terminal preview
//!
//! Runs the same tokenize → flatten → resolve path as an export and prints
//! each segment in its resolved color.

use colored::Colorize;
use snipprok_core::{
    color::{self, Rgba},
    flatten::{flatten, NBSP},
    traits::Tokenizer,
    Theme,
};

/// One colored piece of a preview line
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRun {
    pub text: String,
    pub color: Rgba,
}

/// Lines of colored runs, whitespace restored for the terminal
pub fn preview_lines(
    lexer: &dyn Tokenizer,
    theme: &Theme,
    source: &str,
    language: &str,
) -> Vec<Vec<PreviewRun>> {
    let table = theme.color_table();
    let tokens = lexer.tokenize(source, language);

    flatten(&tokens)
        .iter()
        .map(|line| {
            line.segments
                .iter()
                .map(|segment| PreviewRun {
                    text: segment.text.replace(NBSP, " "),
                    color: color::parse(table.resolve(&segment.types))
                        .unwrap_or(Rgba::transparent()),
                })
                .collect()
        })
        .collect()
}

/// The preview as one string of ANSI truecolor text
pub fn render_preview(lexer: &dyn Tokenizer, theme: &Theme, source: &str, language: &str) -> String {
    let mut out = String::new();
    for line in preview_lines(lexer, theme, source, language) {
        for run in line {
            let painted = run.text.truecolor(run.color.r, run.color.g, run.color.b);
            out.push_str(&painted.to_string());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipprok_lex_syntect::SyntectLexer;

    fn plain(lines: &[Vec<PreviewRun>]) -> Vec<String> {
        lines
            .iter()
            .map(|runs| runs.iter().map(|run| run.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_preview_keeps_text() {
        let lexer = SyntectLexer::new();
        lexer.ensure_ready();
        let lines = preview_lines(&lexer, &Theme::dark(), "fn main() {\n\tlet x = 1;\n}", "rust");
        assert_eq!(plain(&lines), vec!["fn main() {", "  let x = 1;", "}"]);
    }

    #[test]
    fn test_keywords_share_the_export_color() {
        let lexer = SyntectLexer::new();
        lexer.ensure_ready();
        let theme = Theme::dark();
        let keyword = color::parse(theme.color_table().get("keyword").unwrap_or_default());

        let lines = preview_lines(&lexer, &theme, "fn main() {}", "rust");
        let first = lines.first().and_then(|runs| runs.first());
        assert_eq!(first.map(|run| run.text.as_str()), Some("fn"));
        assert_eq!(first.map(|run| run.color), keyword);
    }

    #[test]
    fn test_plain_text_uses_default_color() {
        let lexer = SyntectLexer::new();
        let theme = Theme::dark();
        let default = color::parse(theme.color_table().default_color());
        let lines = preview_lines(&lexer, &theme, "a\nb", "plain");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().flatten().all(|run| Some(run.color) == default));
    }

    #[test]
    fn test_render_preview_has_one_line_per_row() {
        let lexer = SyntectLexer::new();
        let rendered = render_preview(&lexer, &Theme::dark(), "a\nb\nc", "plain");
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.contains('b'));
    }
}
