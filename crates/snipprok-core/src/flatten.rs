//! Token flattening: nested tokens become rows of styled segments
//!
//! Type and alias tags accumulate down the tree, so a segment carries
//! every tag of its ancestors, parents first. Newlines inside any text
//! leaf start a new row. Whitespace is rewritten to non-breaking spaces
//! because the vector renderer collapses ordinary runs of spaces.

use crate::types::{Line, Segment, Token, TokenContent};

/// Replacement for one space
pub const NBSP: char = '\u{00a0}';

/// Replacement for one tab
pub const TAB_EXPANSION: &str = "\u{00a0}\u{00a0}";

/// Flatten a token stream into rows
///
/// Empty text never produces a segment, and rows left empty at the end
/// (a trailing newline, for instance) are dropped.
pub fn flatten(tokens: &[Token]) -> Vec<Line> {
    let mut flattener = Flattener::new();
    for token in tokens {
        flattener.walk(token, &[]);
    }
    flattener.finish()
}

/// Rewrite spaces and tabs so they survive whitespace collapsing
pub fn preserve_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' ' => out.push(NBSP),
            '\t' => out.push_str(TAB_EXPANSION),
            other => out.push(other),
        }
    }
    out
}

struct Flattener {
    lines: Vec<Line>,
}

impl Flattener {
    fn new() -> Self {
        Self {
            lines: vec![Line::default()],
        }
    }

    fn walk(&mut self, token: &Token, inherited: &[String]) {
        match token {
            Token::Text(text) => self.push_text(text, inherited),
            Token::Node {
                kind,
                aliases,
                content,
            } => {
                let mut tags = inherited.to_vec();
                push_unique(&mut tags, kind);
                for alias in aliases {
                    push_unique(&mut tags, alias);
                }

                match content {
                    TokenContent::Text(text) => self.push_text(text, &tags),
                    TokenContent::Children(children) => {
                        for child in children {
                            self.walk(child, &tags);
                        }
                    },
                }
            },
        }
    }

    fn push_text(&mut self, text: &str, tags: &[String]) {
        for (index, piece) in text.split('\n').enumerate() {
            if index > 0 {
                self.break_line();
            }
            if piece.is_empty() {
                continue;
            }

            if let Some(line) = self.lines.last_mut() {
                line.segments.push(Segment {
                    text: preserve_whitespace(piece),
                    types: tags.to_vec(),
                });
            }
        }
    }

    /// CRLF sources: the carriage return belongs to the break, even when
    /// it ended the previous token
    fn break_line(&mut self) {
        if let Some(line) = self.lines.last_mut() {
            if let Some(segment) = line.segments.last_mut() {
                if segment.text.ends_with('\r') {
                    segment.text.pop();
                    if segment.text.is_empty() {
                        line.segments.pop();
                    }
                }
            }
        }
        self.lines.push(Line::default());
    }

    fn finish(mut self) -> Vec<Line> {
        while self.lines.last().is_some_and(Line::is_empty) {
            self.lines.pop();
        }
        self.lines
    }
}

fn push_unique(tags: &mut Vec<String>, tag: &str) {
    if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_string());
    }
}
