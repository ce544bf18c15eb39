//! Themes, color tables and per-segment color resolution
//!
//! A [`Theme`] is static configuration: token type → color, a default text
//! color, and the code block chrome the preview draws. Each export builds a
//! fresh [`ColorTable`] from it with every color normalized.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{color, error::Result};

/// Token types in resolution priority, most significant first
///
/// A segment can carry several overlapping types; the first one here that
/// both the segment and the table know decides its color.
pub const COLOR_PRIORITY: &[&str] = &[
    // at-rules and keywords
    "atrule",
    "keyword",
    "tag",
    "function",
    "class-name",
    // properties and attributes
    "property",
    "attr-name",
    "attr-value",
    "selector",
    // literals
    "string",
    "number",
    "boolean",
    "operator",
    "comment",
    "punctuation",
    // everything else
    "variable",
    "parameter",
    "namespace",
    "builtin",
    "constant",
    "symbol",
    "regex",
    "important",
    "char",
    "key",
];

/// Whether a tag is one of the token types a table can color
pub fn is_known_type(tag: &str) -> bool {
    COLOR_PRIORITY.contains(&tag)
}

/// Chrome of the code block as the preview draws it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockStyle {
    pub background: String,
    pub border_color: String,
    pub border_width: f32,
    pub border_radius: f32,
    pub padding: f32,
    pub text_color: String,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            background: "rgb(23, 23, 23)".to_string(),
            border_color: "rgb(64, 64, 64)".to_string(),
            border_width: 1.0,
            border_radius: 12.0,
            padding: 24.0,
            text_color: "#e5e5e5".to_string(),
        }
    }
}

/// Token palette plus block chrome, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub default_color: String,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    #[serde(default)]
    pub block: BlockStyle,
}

impl Theme {
    /// The built-in dark palette
    pub fn dark() -> Self {
        let tokens = [
            ("atrule", "#c084fc"),
            ("keyword", "#c084fc"),
            ("tag", "#f87171"),
            ("function", "#60a5fa"),
            ("class-name", "#facc15"),
            ("property", "#7dd3fc"),
            ("attr-name", "#fbbf24"),
            ("attr-value", "#86efac"),
            ("selector", "#86efac"),
            ("string", "#86efac"),
            ("number", "#fb923c"),
            ("boolean", "#fb923c"),
            ("operator", "#94a3b8"),
            ("comment", "#737373"),
            ("punctuation", "#a3a3a3"),
            ("variable", "#e5e5e5"),
            ("parameter", "#fda4af"),
            ("namespace", "#fcd34d"),
            ("builtin", "#22d3ee"),
            ("constant", "#fb923c"),
            ("symbol", "#fb923c"),
            ("regex", "#f472b6"),
            ("important", "#f43f5e"),
            ("char", "#86efac"),
            ("key", "#7dd3fc"),
        ]
        .into_iter()
        .map(|(tag, value)| (tag.to_string(), value.to_string()))
        .collect();

        Self {
            name: "dark".to_string(),
            default_color: "#e5e5e5".to_string(),
            tokens,
            block: BlockStyle::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Fresh per-export table with normalized colors
    ///
    /// Unknown token types are skipped; the table only answers for types
    /// the resolver can rank.
    pub fn color_table(&self) -> ColorTable {
        let mut colors = HashMap::new();
        for (tag, value) in &self.tokens {
            if !is_known_type(tag) {
                log::warn!("theme {:?}: ignoring unknown token type {tag:?}", self.name);
                continue;
            }
            colors.insert(tag.clone(), color::normalize(value));
        }

        ColorTable {
            colors,
            default_color: color::normalize(&self.default_color),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Token type → canonical color for one export
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: HashMap<String, String>,
    default_color: String,
}

impl ColorTable {
    pub fn new(colors: HashMap<String, String>, default_color: impl Into<String>) -> Self {
        Self {
            colors,
            default_color: default_color.into(),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.colors.get(tag).map(String::as_str)
    }

    pub fn default_color(&self) -> &str {
        &self.default_color
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for a segment's type set
    ///
    /// Walks [`COLOR_PRIORITY`]; falls back to the default text color.
    pub fn resolve(&self, types: &[String]) -> &str {
        COLOR_PRIORITY
            .iter()
            .filter(|category| types.iter().any(|t| t == *category))
            .find_map(|category| self.get(category))
            .unwrap_or(self.default_color.as_str())
    }
}
