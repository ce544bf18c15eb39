//! Snipprok Core: from highlighted source text to a PNG card
//!
//! The export pipeline turns the state the editor shows (source text,
//! language, numeric style parameters, background color) into a standalone
//! bitmap that does not depend on live layout or fonts.
//!
//! ## The Pipeline
//!
//! 1. **Capture** - Computed styles of the rendered snippet become a [`StyleSnapshot`]
//! 2. **Tokenize** - A grammar turns source text into a [`types::Token`] tree
//! 3. **Flatten** - Tokens become [`types::Line`]s of styled [`types::Segment`]s
//! 4. **Layout** - Lines, colors and sizes become a [`layout::LayoutTree`]
//! 5. **Vectorize** - The tree becomes an SVG document with one embedded font
//! 6. **Rasterize** - The document becomes pixels at the requested scale
//! 7. **Encode** - Pixels become PNG bytes
//!
//! ```rust,ignore
//! use snipprok_core::{Pipeline, ExportParameters};
//!
//! let pipeline = Pipeline::builder()
//!     .tokenizer(lexer)
//!     .fonts(font_chain)
//!     .vectorizer(Arc::new(SvgRenderer::new()))
//!     .rasterizer(Arc::new(ResvgRasterizer::new()))
//!     .encoder(Arc::new(PngExporter::new()))
//!     .build()?;
//!
//! let image = pipeline.process(&element, &params, &theme)?;
//! ```
//!
//! Backends plug in through the traits in [`traits`].

pub mod color;
pub mod context;
pub mod error;
pub mod fields;
pub mod flatten;
pub mod layout;
pub mod pipeline;
pub mod style;
pub mod theme;
pub mod traits;

pub use context::ExportContext;
pub use error::{Result, SnipError};
pub use fields::BoundedField;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use style::{RenderedElement, StyleSnapshot};
pub use theme::{ColorTable, Theme};
pub use traits::{Encoder, FontProvider, Rasterizer, Stage, Tokenizer, VectorRenderer};

/// The data structures that flow between stages
pub mod types {
    /// Content of a token node: a text leaf or nested tokens
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TokenContent {
        Text(String),
        Children(Vec<Token>),
    }

    /// One unit of lexer output
    ///
    /// Newlines inside text are line breaks and are never stripped.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Token {
        Text(String),
        Node {
            kind: String,
            aliases: Vec<String>,
            content: TokenContent,
        },
    }

    impl Token {
        pub fn text(text: impl Into<String>) -> Self {
            Token::Text(text.into())
        }

        /// A typed node wrapping a single text leaf
        pub fn leaf(kind: impl Into<String>, text: impl Into<String>) -> Self {
            Token::Node {
                kind: kind.into(),
                aliases: Vec::new(),
                content: TokenContent::Text(text.into()),
            }
        }

        /// A typed node with nested children
        pub fn node(kind: impl Into<String>, children: Vec<Token>) -> Self {
            Token::Node {
                kind: kind.into(),
                aliases: Vec::new(),
                content: TokenContent::Children(children),
            }
        }

        pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
            if let Token::Node { aliases, .. } = &mut self {
                aliases.push(alias.into());
            }
            self
        }

        /// All text below this token, in order
        pub fn plain_text(&self) -> String {
            let mut out = String::new();
            self.collect_text(&mut out);
            out
        }

        fn collect_text(&self, out: &mut String) {
            match self {
                Token::Text(text) => out.push_str(text),
                Token::Node { content, .. } => match content {
                    TokenContent::Text(text) => out.push_str(text),
                    TokenContent::Children(children) => {
                        for child in children {
                            child.collect_text(out);
                        }
                    },
                },
            }
        }
    }

    /// A run of text sharing one set of type tags
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Segment {
        pub text: String,
        /// Deduplicated, first-seen order
        pub types: Vec<String>,
    }

    /// One visual row of code
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Line {
        pub segments: Vec<Segment>,
    }

    impl Line {
        pub fn is_empty(&self) -> bool {
            self.segments.is_empty()
        }

        /// Text of the row as rendered (non-breaking spaces included)
        pub fn text(&self) -> String {
            self.segments.iter().map(|s| s.text.as_str()).collect()
        }
    }

    /// Straight-alpha RGBA pixels
    #[derive(Debug, Clone)]
    pub struct BitmapData {
        pub width: u32,
        pub height: u32,
        pub data: Vec<u8>,
    }

    /// SVG document produced from a layout tree
    #[derive(Debug, Clone)]
    pub struct VectorDocument {
        pub svg: String,
        pub width: u32,
        pub height: u32,
    }

    /// Exactly one TrueType-compatible font, with where it came from
    #[derive(Debug, Clone)]
    pub struct FontData {
        pub bytes: std::sync::Arc<Vec<u8>>,
        pub origin: String,
    }

    impl FontData {
        pub fn new(bytes: Vec<u8>, origin: impl Into<String>) -> Self {
            Self {
                bytes: std::sync::Arc::new(bytes),
                origin: origin.into(),
            }
        }
    }

    /// Encoded output of one export
    #[derive(Debug, Clone)]
    pub struct RenderedImage {
        pub bytes: Vec<u8>,
        /// Final pixel size, scale applied
        pub width: u32,
        pub height: u32,
        pub line_count: usize,
        pub mime_type: &'static str,
        pub extension: &'static str,
    }
}

/// Pixel-density multiplier applied during rasterization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelScale {
    #[default]
    X1,
    X2,
    X3,
}

impl PixelScale {
    pub const fn factor(self) -> u32 {
        match self {
            PixelScale::X1 => 1,
            PixelScale::X2 => 2,
            PixelScale::X3 => 3,
        }
    }
}

impl TryFrom<u32> for PixelScale {
    type Error = SnipError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(PixelScale::X1),
            2 => Ok(PixelScale::X2),
            3 => Ok(PixelScale::X3),
            other => Err(SnipError::Config(format!(
                "pixel scale must be 1, 2 or 3 (got {other})"
            ))),
        }
    }
}

impl std::fmt::Display for PixelScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.factor())
    }
}

/// What the editor hands to one export. Never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParameters {
    pub font_size_px: u32,
    pub background_color: String,
    pub outer_padding_px: u32,
    pub pixel_scale: PixelScale,
    pub width_px: u32,
    pub language_tag: String,
    pub source_text: String,
}

impl Default for ExportParameters {
    fn default() -> Self {
        Self {
            font_size_px: 14,
            background_color: "#0b0b0f".to_string(),
            outer_padding_px: 32,
            pixel_scale: PixelScale::X1,
            width_px: 640,
            language_tag: "plain".to_string(),
            source_text: String::new(),
        }
    }
}
