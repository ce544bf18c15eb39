//! Lexer adapter over syntect's bundled grammars
//!
//! Source text becomes a nested [`Token`] tree. syntect scopes map onto the
//! token types the color table knows, and nested scopes become nested nodes,
//! so a keyword inside a string interpolation carries both tags.
//!
//! Grammars load once per process through [`ensure_ready`]. Until then every
//! language tokenizes as plain text.

use once_cell::sync::OnceCell;
use snipprok_core::{traits::Tokenizer, types::Token};
use syntect::{
    parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

pub mod grammar;
pub mod scopes;

static SYNTAXES: OnceCell<SyntaxSet> = OnceCell::new();

/// Load the grammar set; later calls return the same set
pub fn ensure_ready() -> &'static SyntaxSet {
    SYNTAXES.get_or_init(|| {
        log::debug!("loading syntect grammars");
        let set = SyntaxSet::load_defaults_newlines();
        log::debug!("loaded {} grammars", set.syntaxes().len());
        set
    })
}

/// Whether [`ensure_ready`] has completed
pub fn is_ready() -> bool {
    SYNTAXES.get().is_some()
}

/// Canonical grammars with their aliases, for listings
pub fn languages() -> Vec<(&'static str, Vec<&'static str>)> {
    grammar::GRAMMARS
        .iter()
        .map(|(name, _)| (*name, grammar::aliases_of(name)))
        .collect()
}

/// Tokenizer backed by syntect
///
/// Share one instance between the preview and the export pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectLexer;

impl SyntectLexer {
    pub fn new() -> Self {
        Self
    }

    /// Name of the syntect grammar a canonical grammar runs on
    ///
    /// `None` for plain text and before the grammars are loaded.
    pub fn backing_syntax(&self, canonical: &str) -> Option<&'static str> {
        let syntaxes = SYNTAXES.get()?;
        find_syntax(syntaxes, canonical).map(|syntax| syntax.name.as_str())
    }
}

impl Tokenizer for SyntectLexer {
    fn name(&self) -> &'static str {
        "syntect"
    }

    fn canonical_language(&self, language: &str) -> String {
        grammar::resolve(language).to_string()
    }

    fn ensure_ready(&self) {
        ensure_ready();
    }

    fn tokenize(&self, source: &str, language: &str) -> Vec<Token> {
        let canonical = grammar::resolve(language);
        if canonical == grammar::PLAIN || source.is_empty() {
            return vec![Token::text(source)];
        }

        let Some(syntaxes) = SYNTAXES.get() else {
            log::debug!("grammars not loaded, tokenizing {canonical} as plain text");
            return vec![Token::text(source)];
        };
        let Some(syntax) = find_syntax(syntaxes, canonical) else {
            log::warn!("no bundled grammar for {canonical}, using plain text");
            return vec![Token::text(source)];
        };

        log::trace!("tokenizing {canonical} with syntect grammar {:?}", syntax.name);
        match highlight(syntaxes, syntax, source) {
            Ok(tokens) => tokens,
            Err(reason) => {
                log::warn!("tokenizing {canonical} failed ({reason}), using plain text");
                vec![Token::text(source)]
            },
        }
    }
}

fn find_syntax<'a>(syntaxes: &'a SyntaxSet, canonical: &str) -> Option<&'a SyntaxReference> {
    grammar::candidates(canonical)
        .iter()
        .find_map(|token| syntaxes.find_syntax_by_token(token))
}

fn highlight(
    syntaxes: &SyntaxSet,
    syntax: &SyntaxReference,
    source: &str,
) -> std::result::Result<Vec<Token>, String> {
    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut builder = TreeBuilder::default();
    let mut path: Vec<&'static str> = Vec::new();

    for line in LinesWithEndings::from(source) {
        let ops = state
            .parse_line(line, syntaxes)
            .map_err(|e| e.to_string())?;

        let mut cursor = 0;
        for (offset, op) in ops {
            let offset = offset.min(line.len());
            if offset > cursor {
                builder.push(&line[cursor..offset], &path);
                cursor = offset;
            }
            stack.apply(&op).map_err(|e| format!("{e:?}"))?;
            path = type_path(&stack);
        }
        if cursor < line.len() {
            builder.push(&line[cursor..], &path);
        }
    }

    Ok(builder.finish())
}

/// Token types of a scope stack, outermost first, repeats folded
fn type_path(stack: &ScopeStack) -> Vec<&'static str> {
    let mut path = Vec::new();
    for scope in stack.as_slice() {
        if let Some(kind) = scopes::token_type(&scope.build_string()) {
            if path.last() != Some(&kind) {
                path.push(kind);
            }
        }
    }
    path
}

/// Builds nested tokens from text chunks tagged with type paths
///
/// Open frames mirror the current path; a new chunk closes frames past the
/// common prefix and opens the rest.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Token>,
    frames: Vec<(&'static str, Vec<Token>)>,
}

impl TreeBuilder {
    fn push(&mut self, text: &str, path: &[&'static str]) {
        if text.is_empty() {
            return;
        }

        let common = self
            .frames
            .iter()
            .zip(path)
            .take_while(|((open, _), kind)| open == *kind)
            .count();
        while self.frames.len() > common {
            self.close();
        }
        for kind in &path[common..] {
            self.frames.push((*kind, Vec::new()));
        }

        let target = self.target();
        if let Some(Token::Text(previous)) = target.last_mut() {
            previous.push_str(text);
            return;
        }
        target.push(Token::text(text));
    }

    fn target(&mut self) -> &mut Vec<Token> {
        match self.frames.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn close(&mut self) {
        if let Some((kind, mut children)) = self.frames.pop() {
            let node = if matches!(children.as_slice(), [Token::Text(_)]) {
                match children.pop() {
                    Some(Token::Text(text)) => Token::leaf(kind, text),
                    _ => Token::node(kind, children),
                }
            } else {
                Token::node(kind, children)
            };
            self.target().push(node);
        }
    }

    fn finish(mut self) -> Vec<Token> {
        while !self.frames.is_empty() {
            self.close();
        }
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipprok_core::types::TokenContent;

    fn text_of(tokens: &[Token]) -> String {
        tokens.iter().map(Token::plain_text).collect()
    }

    fn kinds(tokens: &[Token], out: &mut Vec<String>) {
        for token in tokens {
            if let Token::Node { kind, content, .. } = token {
                out.push(kind.clone());
                if let TokenContent::Children(children) = content {
                    kinds(children, out);
                }
            }
        }
    }

    #[test]
    fn test_tree_builder_nests_and_merges() {
        let mut builder = TreeBuilder::default();
        builder.push("\"a ", &["string"]);
        builder.push("${", &["string", "punctuation"]);
        builder.push("x", &["string"]);
        builder.push("y", &["string"]);
        builder.push(" ", &[]);
        let tokens = builder.finish();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::text(" "));
        match &tokens[0] {
            Token::Node {
                kind,
                content: TokenContent::Children(children),
                ..
            } => {
                assert_eq!(kind, "string");
                assert_eq!(children, &vec![
                    Token::text("\"a "),
                    Token::leaf("punctuation", "${"),
                    Token::text("xy"),
                ]);
            },
            other => unreachable!("expected a string node, got {other:?}"),
        }
    }

    #[test]
    fn test_single_text_child_collapses_to_leaf() {
        let mut builder = TreeBuilder::default();
        builder.push("fn", &["keyword"]);
        assert_eq!(builder.finish(), vec![Token::leaf("keyword", "fn")]);
    }

    #[test]
    fn test_plain_language_is_one_text_token() {
        let lexer = SyntectLexer::new();
        let tokens = lexer.tokenize("a\nb", "plain");
        assert_eq!(tokens, vec![Token::text("a\nb")]);
        assert_eq!(lexer.tokenize("x", "klingon"), vec![Token::text("x")]);
    }

    #[test]
    fn test_rust_keywords_are_tagged() {
        let lexer = SyntectLexer::new();
        lexer.ensure_ready();
        let source = "fn main() {\n    let x = 42;\n}\n";
        let tokens = lexer.tokenize(source, "rs");

        assert_eq!(text_of(&tokens), source);
        let mut found = Vec::new();
        kinds(&tokens, &mut found);
        assert!(found.iter().any(|k| k == "keyword"), "kinds: {found:?}");
        assert!(found.iter().any(|k| k == "number"), "kinds: {found:?}");
    }

    #[test]
    fn test_yml_tokenizes_like_yaml() {
        let lexer = SyntectLexer::new();
        lexer.ensure_ready();
        let source = "name: snipprok\nversion: 3\n";
        assert_eq!(lexer.tokenize(source, "yml"), lexer.tokenize(source, "yaml"));
        assert_eq!(lexer.canonical_language("yml"), "yaml");
    }

    #[test]
    fn test_typescript_runs_on_javascript_grammar() {
        let lexer = SyntectLexer::new();
        lexer.ensure_ready();
        assert_eq!(lexer.backing_syntax("javascript"), Some("JavaScript"));
        assert!(lexer.backing_syntax("typescript").is_some());
        assert_eq!(lexer.backing_syntax(grammar::PLAIN), None);
    }

    #[test]
    fn test_ensure_ready_is_idempotent() {
        let first = ensure_ready() as *const SyntaxSet;
        let second = ensure_ready() as *const SyntaxSet;
        assert_eq!(first, second);
        assert!(is_ready());
    }

    #[test]
    fn test_languages_lists_every_grammar() {
        let listed = languages();
        assert_eq!(listed.len(), grammar::GRAMMARS.len());
        assert!(listed.iter().any(|(name, aliases)| *name == "yaml" && aliases == &vec!["yml"]));
    }
}
