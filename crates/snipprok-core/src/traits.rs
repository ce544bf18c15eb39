//! The contracts that bind every backend together
//!
//! Each trait is one role in the export pipeline. Backends live in their
//! own crates and plug in through these.
//!
//! - [`Stage`] - One step of the pipeline, context in, context out
//! - [`Tokenizer`] - Source text becomes a token tree
//! - [`FontProvider`] - Exactly one embeddable font, or a clear failure
//! - [`VectorRenderer`] - A layout tree becomes an SVG document
//! - [`Rasterizer`] - An SVG document becomes pixels
//! - [`Encoder`] - Pixels become file bytes

use crate::{
    context::ExportContext,
    error::Result,
    layout::LayoutTree,
    types::{BitmapData, FontData, Token, VectorDocument},
    PixelScale,
};

/// One step of the export
///
/// ```ignore
/// struct Watermark;
///
/// impl Stage for Watermark {
///     fn name(&self) -> &'static str {
///         "Watermark"
///     }
///
///     fn process(&self, context: ExportContext) -> Result<ExportContext> {
///         Ok(context)
///     }
/// }
/// ```
pub trait Stage: Send + Sync {
    /// Used for logging
    fn name(&self) -> &'static str;

    /// Take the context, add this stage's result, hand it on
    fn process(&self, context: ExportContext) -> Result<ExportContext>;
}

/// Source text to tokens for a language tag
///
/// Tokenizing never fails. Unknown tags and unparseable input degrade to
/// plain text.
pub trait Tokenizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn tokenize(&self, source: &str, language: &str) -> Vec<Token>;

    /// Canonical grammar a tag resolves to
    fn canonical_language(&self, language: &str) -> String {
        language.to_ascii_lowercase()
    }

    /// Load grammars up front; safe to call repeatedly
    fn ensure_ready(&self) {}
}

/// Supplies the single font embedded in the vector document
pub trait FontProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// First usable font, or `FontError::Exhausted`
    fn acquire(&self) -> Result<FontData>;
}

/// Layout tree to vector document
pub trait VectorRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, layout: &LayoutTree, font: &FontData) -> Result<VectorDocument>;
}

/// Vector document to pixels
pub trait Rasterizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time runtime setup; later calls return immediately
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Output is `document size × scale` pixels
    fn rasterize(
        &self,
        document: &VectorDocument,
        font: &FontData,
        scale: PixelScale,
    ) -> Result<BitmapData>;
}

/// Pixels to file bytes
pub trait Encoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn encode(&self, bitmap: &BitmapData) -> Result<Vec<u8>>;

    /// File extension, without the dot
    fn extension(&self) -> &'static str;

    fn mime_type(&self) -> &'static str;
}
