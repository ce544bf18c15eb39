//! Snipprok: code snippets as shareable PNG cards
//!
//! [`Snipprok`] wires the default backends into one export pipeline:
//! syntect for tokens, the bundled font chain, the SVG renderer, resvg and
//! the PNG encoder. The same lexer instance drives the terminal preview, so
//! what you preview is what you export.
//!
//! ```ignore
//! use snipprok::prelude::*;
//!
//! let snipprok = Snipprok::new()?;
//! let params = ExportParameters {
//!     language_tag: "rust".into(),
//!     source_text: "fn main() {}".into(),
//!     ..ExportParameters::default()
//! };
//! let image = snipprok.render(&params)?;
//! ```
//!
//! For saving to disk with one export at a time, see [`session::ExportSession`].

use std::sync::Arc;

pub use snipprok_core::{
    color, error, fields, flatten, layout, style, theme, traits, types, BoundedField,
    ExportParameters, Pipeline, PixelScale, RenderedElement, Result, SnipError, Theme,
};

pub use snipprok_export as export;
pub use snipprok_fontdb as fontdb;
pub use snipprok_lex_syntect as lex;
pub use snipprok_render_resvg as render_resvg;
pub use snipprok_render_svg as render_svg;

pub mod preview;
pub mod session;

use snipprok_core::{
    traits::{FontProvider, Tokenizer, VectorRenderer},
    types::RenderedImage,
};
use snipprok_export::PngExporter;
use snipprok_fontdb::FontChain;
use snipprok_lex_syntect::SyntectLexer;
use snipprok_render_resvg::ResvgRasterizer;
use snipprok_render_svg::SvgRenderer;

/// Theme, lexer and a ready-built pipeline
pub struct Snipprok {
    lexer: Arc<SyntectLexer>,
    theme: Theme,
    pipeline: Pipeline,
}

impl Snipprok {
    /// Dark theme, bundled font chain
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> SnipprokBuilder {
        SnipprokBuilder::default()
    }

    /// The lexer shared by preview and export
    pub fn lexer(&self) -> &Arc<SyntectLexer> {
        &self.lexer
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Load grammars and warm up the rasterizer ahead of the first export
    pub fn prepare(&self) -> Result<()> {
        self.pipeline.prepare()
    }

    /// Export the snippet as the preview would render it
    pub fn render(&self, params: &ExportParameters) -> Result<RenderedImage> {
        let element = RenderedElement::code_block(&self.theme.block, params);
        self.render_element(&element, params)
    }

    /// Export against an element tree supplied by the caller
    pub fn render_element(
        &self,
        element: &RenderedElement,
        params: &ExportParameters,
    ) -> Result<RenderedImage> {
        log::debug!(
            "exporting {} bytes of {} at {}",
            params.source_text.len(),
            self.lexer.canonical_language(&params.language_tag),
            params.pixel_scale
        );
        self.pipeline.process(element, params, &self.theme)
    }

    /// ANSI-colored rendition of the snippet
    pub fn preview(&self, source: &str, language: &str) -> String {
        self.lexer.ensure_ready();
        preview::render_preview(self.lexer.as_ref(), &self.theme, source, language)
    }
}

/// Swap individual parts of the default setup
#[derive(Default)]
pub struct SnipprokBuilder {
    lexer: Option<Arc<SyntectLexer>>,
    theme: Option<Theme>,
    fonts: Option<Arc<dyn FontProvider>>,
    vectorizer: Option<Arc<dyn VectorRenderer>>,
}

impl SnipprokBuilder {
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn lexer(mut self, lexer: Arc<SyntectLexer>) -> Self {
        self.lexer = Some(lexer);
        self
    }

    /// Font source; defaults to [`FontChain::bundled`]
    pub fn fonts(mut self, fonts: Arc<dyn FontProvider>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn vectorizer(mut self, vectorizer: Arc<dyn VectorRenderer>) -> Self {
        self.vectorizer = Some(vectorizer);
        self
    }

    pub fn build(self) -> Result<Snipprok> {
        let lexer = self.lexer.unwrap_or_else(|| Arc::new(SyntectLexer::new()));
        let fonts = self
            .fonts
            .unwrap_or_else(|| Arc::new(FontChain::bundled()) as Arc<dyn FontProvider>);
        let vectorizer = self
            .vectorizer
            .unwrap_or_else(|| Arc::new(SvgRenderer::new()) as Arc<dyn VectorRenderer>);

        let pipeline = Pipeline::builder()
            .tokenizer(lexer.clone() as Arc<dyn Tokenizer>)
            .fonts(fonts)
            .vectorizer(vectorizer)
            .rasterizer(Arc::new(ResvgRasterizer::new()))
            .encoder(Arc::new(PngExporter::new()))
            .build()?;

        Ok(Snipprok {
            lexer,
            theme: self.theme.unwrap_or_else(Theme::dark),
            pipeline,
        })
    }
}

/// Common imports for typical usage
pub mod prelude {
    pub use crate::session::{ExportReport, ExportSession, Notification};
    pub use crate::{Snipprok, SnipprokBuilder};
    pub use snipprok_core::{
        error::{Result, SnipError},
        traits::{Encoder, FontProvider, Rasterizer, Tokenizer, VectorRenderer},
        types::RenderedImage,
        BoundedField, ExportParameters, PixelScale, Theme,
    };
    pub use snipprok_export::{DirectorySink, Sink};
    pub use snipprok_fontdb::FontChain;
}
