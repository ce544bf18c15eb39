//! The container that carries one export through the pipeline stages

use std::sync::Arc;

use crate::{
    layout::LayoutTree,
    style::{RenderedElement, StyleSnapshot},
    theme::{ColorTable, Theme},
    traits::{Encoder, FontProvider, Rasterizer, Tokenizer, VectorRenderer},
    types::{BitmapData, FontData, Line, Token, VectorDocument},
    ExportParameters,
};

/// Inputs, backends and intermediate results of one export
///
/// Created fresh per export and dropped at its end. Each stage fills in
/// one result slot.
pub struct ExportContext {
    // What the editor hands over
    element: RenderedElement,
    params: ExportParameters,
    colors: ColorTable,

    // Who does the work
    tokenizer: Option<Arc<dyn Tokenizer>>,
    fonts: Option<Arc<dyn FontProvider>>,
    vectorizer: Option<Arc<dyn VectorRenderer>>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    encoder: Option<Arc<dyn Encoder>>,

    // What emerges along the way
    snapshot: Option<StyleSnapshot>,
    tokens: Option<Vec<Token>>,
    lines: Option<Vec<Line>>,
    layout: Option<LayoutTree>,
    font: Option<FontData>,
    document: Option<VectorDocument>,
    bitmap: Option<BitmapData>,
    encoded: Option<Vec<u8>>,
}

impl ExportContext {
    /// Start an export; the color table is built from the theme right away
    pub fn new(element: RenderedElement, params: ExportParameters, theme: &Theme) -> Self {
        Self {
            element,
            params,
            colors: theme.color_table(),
            tokenizer: None,
            fonts: None,
            vectorizer: None,
            rasterizer: None,
            encoder: None,
            snapshot: None,
            tokens: None,
            lines: None,
            layout: None,
            font: None,
            document: None,
            bitmap: None,
            encoded: None,
        }
    }

    pub fn element(&self) -> &RenderedElement {
        &self.element
    }

    pub fn params(&self) -> &ExportParameters {
        &self.params
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn tokenizer(&self) -> Option<Arc<dyn Tokenizer>> {
        self.tokenizer.clone()
    }

    pub fn fonts(&self) -> Option<Arc<dyn FontProvider>> {
        self.fonts.clone()
    }

    pub fn vectorizer(&self) -> Option<Arc<dyn VectorRenderer>> {
        self.vectorizer.clone()
    }

    pub fn rasterizer(&self) -> Option<Arc<dyn Rasterizer>> {
        self.rasterizer.clone()
    }

    pub fn encoder(&self) -> Option<Arc<dyn Encoder>> {
        self.encoder.clone()
    }

    pub fn snapshot(&self) -> Option<&StyleSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        self.tokens.as_deref()
    }

    pub fn lines(&self) -> Option<&[Line]> {
        self.lines.as_deref()
    }

    pub fn layout(&self) -> Option<&LayoutTree> {
        self.layout.as_ref()
    }

    pub fn font(&self) -> Option<&FontData> {
        self.font.as_ref()
    }

    pub fn document(&self) -> Option<&VectorDocument> {
        self.document.as_ref()
    }

    pub fn bitmap(&self) -> Option<&BitmapData> {
        self.bitmap.as_ref()
    }

    pub fn encoded(&self) -> Option<&[u8]> {
        self.encoded.as_deref()
    }

    pub fn set_tokenizer(&mut self, tokenizer: Arc<dyn Tokenizer>) {
        self.tokenizer = Some(tokenizer);
    }

    pub fn set_fonts(&mut self, fonts: Arc<dyn FontProvider>) {
        self.fonts = Some(fonts);
    }

    pub fn set_vectorizer(&mut self, vectorizer: Arc<dyn VectorRenderer>) {
        self.vectorizer = Some(vectorizer);
    }

    pub fn set_rasterizer(&mut self, rasterizer: Arc<dyn Rasterizer>) {
        self.rasterizer = Some(rasterizer);
    }

    pub fn set_encoder(&mut self, encoder: Arc<dyn Encoder>) {
        self.encoder = Some(encoder);
    }

    pub fn set_snapshot(&mut self, snapshot: StyleSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.tokens = Some(tokens);
    }

    pub fn set_lines(&mut self, lines: Vec<Line>) {
        self.lines = Some(lines);
    }

    pub fn set_layout(&mut self, layout: LayoutTree) {
        self.layout = Some(layout);
    }

    pub fn set_font(&mut self, font: FontData) {
        self.font = Some(font);
    }

    pub fn set_document(&mut self, document: VectorDocument) {
        self.document = Some(document);
    }

    pub fn set_bitmap(&mut self, bitmap: BitmapData) {
        self.bitmap = Some(bitmap);
    }

    pub fn set_encoded(&mut self, encoded: Vec<u8>) {
        self.encoded = Some(encoded);
    }

    /// Hand the encoded bytes and bitmap over, dropping everything else
    pub(crate) fn into_outputs(self) -> (Option<Vec<u8>>, Option<BitmapData>, Option<Vec<Line>>) {
        (self.encoded, self.bitmap, self.lines)
    }
}
