//! syntect scope names → token type tags

/// Scope prefix → token type, most specific first
const SCOPE_TYPES: &[(&str, &str)] = &[
    ("keyword.control.at-rule", "atrule"),
    ("keyword.other.important", "important"),
    ("keyword.operator", "operator"),
    ("keyword", "keyword"),
    ("storage", "keyword"),
    ("entity.name.tag", "tag"),
    ("entity.name.function", "function"),
    ("support.function.builtin", "builtin"),
    ("support.function", "function"),
    ("meta.function-call", "function"),
    ("entity.name.class", "class-name"),
    ("entity.name.type", "class-name"),
    ("entity.other.inherited-class", "class-name"),
    ("support.class", "class-name"),
    ("support.type.property-name", "property"),
    ("support.type", "class-name"),
    ("entity.other.attribute-name", "attr-name"),
    ("meta.selector", "selector"),
    ("entity.name.namespace", "namespace"),
    ("entity.name.module", "namespace"),
    ("meta.mapping.key", "key"),
    ("string.regexp", "regex"),
    ("string", "string"),
    ("constant.numeric", "number"),
    ("constant.language", "boolean"),
    ("constant.character", "char"),
    ("constant.other.symbol", "symbol"),
    ("constant", "constant"),
    ("support.constant", "constant"),
    ("comment", "comment"),
    ("punctuation", "punctuation"),
    ("variable.parameter", "parameter"),
    ("variable.language", "builtin"),
    ("variable", "variable"),
];

/// Token type for one scope, e.g. `keyword.control.rust` → `keyword`
pub fn token_type(scope: &str) -> Option<&'static str> {
    SCOPE_TYPES
        .iter()
        .find(|(prefix, _)| {
            scope == *prefix
                || scope
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_prefixes_win() {
        assert_eq!(token_type("keyword.operator.arithmetic.rust"), Some("operator"));
        assert_eq!(token_type("keyword.control.rust"), Some("keyword"));
        assert_eq!(token_type("keyword.control.at-rule.import.css"), Some("atrule"));
        assert_eq!(token_type("string.regexp.js"), Some("regex"));
        assert_eq!(token_type("string.quoted.double.json"), Some("string"));
        assert_eq!(token_type("constant.numeric.integer.decimal.rust"), Some("number"));
        assert_eq!(token_type("constant.language.boolean.true.yaml"), Some("boolean"));
    }

    #[test]
    fn test_prefix_must_end_at_a_dot() {
        assert_eq!(token_type("stringly.typed"), None);
        assert_eq!(token_type("comment"), Some("comment"));
    }

    #[test]
    fn test_structural_scopes_are_untyped() {
        assert_eq!(token_type("source.rust"), None);
        assert_eq!(token_type("meta.block.rust"), None);
        assert_eq!(token_type("text.plain"), None);
    }

    #[test]
    fn test_every_type_is_colorable() {
        for (_, kind) in SCOPE_TYPES {
            assert!(snipprok_core::theme::is_known_type(kind), "{kind}");
        }
    }
}
