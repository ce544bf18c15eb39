//! Language tags, aliases and the grammars behind them

/// Grammar used when nothing else matches
pub const PLAIN: &str = "plain";

/// Canonical grammars and the syntect lookup tokens to try, in order
///
/// syntect's bundled set has no TypeScript or JSX grammar, so those degrade
/// to JavaScript before falling back to plain text.
pub const GRAMMARS: &[(&str, &[&str])] = &[
    ("markup", &["html", "xml"]),
    ("css", &["css"]),
    ("clike", &["c", "cpp"]),
    ("javascript", &["js"]),
    ("typescript", &["ts", "js"]),
    ("jsx", &["jsx", "js"]),
    ("tsx", &["tsx", "ts", "js"]),
    ("json", &["json"]),
    ("yaml", &["yaml", "yml"]),
    ("bash", &["bash", "sh"]),
    ("python", &["py"]),
    ("ruby", &["rb"]),
    ("go", &["go"]),
    ("rust", &["rs"]),
    (PLAIN, &[]),
];

/// Short or alternate tags → canonical grammar
pub const ALIASES: &[(&str, &str)] = &[
    ("ts", "typescript"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("yml", "yaml"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("zsh", "bash"),
    ("txt", PLAIN),
    ("text", PLAIN),
    ("html", "markup"),
    ("xml", "markup"),
    ("svg", "markup"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("golang", "go"),
    ("c", "clike"),
    ("cpp", "clike"),
];

/// Resolve any tag to a canonical grammar name
///
/// Unknown tags resolve to [`PLAIN`].
pub fn resolve(tag: &str) -> &'static str {
    let tag = tag.trim().to_ascii_lowercase();

    if let Some((name, _)) = GRAMMARS.iter().find(|(name, _)| *name == tag) {
        return name;
    }
    if let Some((_, target)) = ALIASES.iter().find(|(alias, _)| *alias == tag) {
        return target;
    }

    log::warn!("unknown language {tag:?}, using plain text");
    PLAIN
}

/// syntect lookup tokens for a canonical grammar
pub fn candidates(canonical: &str) -> &'static [&'static str] {
    GRAMMARS
        .iter()
        .find(|(name, _)| *name == canonical)
        .map_or(&[], |(_, tokens)| tokens)
}

/// Aliases pointing at a canonical grammar
pub fn aliases_of(canonical: &str) -> Vec<&'static str> {
    ALIASES
        .iter()
        .filter(|(_, target)| *target == canonical)
        .map(|(alias, _)| *alias)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yml_and_yaml_share_a_grammar() {
        assert_eq!(resolve("yml"), resolve("yaml"));
        assert_eq!(resolve("YML"), "yaml");
    }

    #[test]
    fn test_plain_aliases() {
        for tag in ["txt", "plain", "text", "", "brainfuck"] {
            assert_eq!(resolve(tag), PLAIN, "tag {tag:?}");
        }
    }

    #[test]
    fn test_every_alias_targets_a_grammar() {
        for (alias, target) in ALIASES {
            assert!(
                GRAMMARS.iter().any(|(name, _)| name == target),
                "{alias} → {target}"
            );
        }
    }

    #[test]
    fn test_typescript_degrades_to_javascript() {
        assert_eq!(candidates(resolve("ts")), &["ts", "js"]);
        assert!(candidates(PLAIN).is_empty());
        assert_eq!(aliases_of("bash"), vec!["sh", "shell", "zsh"]);
    }
}
