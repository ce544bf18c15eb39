//! The engine that drives one export through its stages

use std::sync::Arc;

use crate::{
    context::ExportContext,
    error::{RenderError, Result, SnipError},
    flatten::flatten,
    layout,
    style::{self, RenderedElement},
    theme::Theme,
    traits::{Encoder, FontProvider, Rasterizer, Stage, Tokenizer, VectorRenderer},
    types::RenderedImage,
    ExportParameters,
};

/// Export pipeline: rendered snippet → PNG bytes
///
/// The default stages run in order:
/// 1. **Capture** - Style snapshot from the rendered element
/// 2. **Tokenize** - Source text through the lexer
/// 3. **Flatten** - Token tree into lines of segments
/// 4. **Layout** - Positioned, colored layout tree
/// 5. **FontAcquisition** - Walk the font chain for one embeddable font
/// 6. **Vectorize** - Layout tree into an SVG document
/// 7. **Rasterize** - SVG into pixels at the requested scale
/// 8. **Encode** - Pixels into file bytes
///
/// ```ignore
/// let pipeline = Pipeline::builder()
///     .tokenizer(lexer)
///     .fonts(Arc::new(FontChain::bundled()))
///     .vectorizer(Arc::new(SvgRenderer::new()))
///     .rasterizer(Arc::new(ResvgRasterizer::new()))
///     .encoder(Arc::new(PngExporter::new()))
///     .build()?;
///
/// let image = pipeline.process(&element, &params, &Theme::dark())?;
/// ```
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    fonts: Option<Arc<dyn FontProvider>>,
    vectorizer: Option<Arc<dyn VectorRenderer>>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    encoder: Option<Arc<dyn Encoder>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Names of the stages in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Warm up the lexer grammars and the rasterizer runtime
    pub fn prepare(&self) -> Result<()> {
        if let Some(tokenizer) = &self.tokenizer {
            tokenizer.ensure_ready();
        }
        if let Some(rasterizer) = &self.rasterizer {
            rasterizer.ensure_ready()?;
        }
        Ok(())
    }

    /// Export one snippet
    ///
    /// Nothing is written anywhere; the caller owns the returned bytes.
    pub fn process(
        &self,
        element: &RenderedElement,
        params: &ExportParameters,
        theme: &Theme,
    ) -> Result<RenderedImage> {
        let encoder = self
            .encoder
            .as_ref()
            .ok_or_else(|| SnipError::Config("No encoder configured".into()))?;
        for (missing, role) in [
            (self.tokenizer.is_none(), "tokenizer"),
            (self.fonts.is_none(), "font provider"),
            (self.vectorizer.is_none(), "vector renderer"),
            (self.rasterizer.is_none(), "rasterizer"),
        ] {
            if missing {
                return Err(SnipError::Config(format!("No {role} configured")));
            }
        }

        let context = ExportContext::new(element.clone(), params.clone(), theme);
        let context = self.execute(context)?;
        let (encoded, bitmap, lines) = context.into_outputs();

        let bitmap =
            bitmap.ok_or_else(|| SnipError::Pipeline("No bitmap produced".into()))?;
        let bytes =
            encoded.ok_or_else(|| SnipError::Pipeline("No encoded output produced".into()))?;

        Ok(RenderedImage {
            bytes,
            width: bitmap.width,
            height: bitmap.height,
            line_count: lines.map_or(0, |lines| lines.len()),
            mime_type: encoder.mime_type(),
            extension: encoder.extension(),
        })
    }

    /// Run every stage over a prepared context
    pub fn execute(&self, mut context: ExportContext) -> Result<ExportContext> {
        if let Some(tokenizer) = &self.tokenizer {
            context.set_tokenizer(tokenizer.clone());
        }
        if let Some(fonts) = &self.fonts {
            context.set_fonts(fonts.clone());
        }
        if let Some(vectorizer) = &self.vectorizer {
            context.set_vectorizer(vectorizer.clone());
        }
        if let Some(rasterizer) = &self.rasterizer {
            context.set_rasterizer(rasterizer.clone());
        }
        if let Some(encoder) = &self.encoder {
            context.set_encoder(encoder.clone());
        }

        for stage in &self.stages {
            log::debug!("Executing stage: {}", stage.name());
            context = stage.process(context)?;
        }

        Ok(context)
    }
}

/// Builds pipelines piece by piece
///
/// Custom stages replace the default eight entirely.
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    fonts: Option<Arc<dyn FontProvider>>,
    vectorizer: Option<Arc<dyn VectorRenderer>>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    encoder: Option<Arc<dyn Encoder>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            tokenizer: None,
            fonts: None,
            vectorizer: None,
            rasterizer: None,
            encoder: None,
        }
    }

    pub fn stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// The lexer; share the same instance with the preview
    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn fonts(mut self, fonts: Arc<dyn FontProvider>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn vectorizer(mut self, vectorizer: Arc<dyn VectorRenderer>) -> Self {
        self.vectorizer = Some(vectorizer);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let stages = if self.stages.is_empty() {
            vec![
                Box::new(CaptureStage) as Box<dyn Stage>,
                Box::new(TokenizeStage) as Box<dyn Stage>,
                Box::new(FlattenStage) as Box<dyn Stage>,
                Box::new(LayoutStage) as Box<dyn Stage>,
                Box::new(FontAcquisitionStage) as Box<dyn Stage>,
                Box::new(VectorizeStage) as Box<dyn Stage>,
                Box::new(RasterizeStage) as Box<dyn Stage>,
                Box::new(EncodeStage) as Box<dyn Stage>,
            ]
        } else {
            self.stages
        };

        Ok(Pipeline {
            stages,
            tokenizer: self.tokenizer,
            fonts: self.fonts,
            vectorizer: self.vectorizer,
            rasterizer: self.rasterizer,
            encoder: self.encoder,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct CaptureStage;
impl Stage for CaptureStage {
    fn name(&self) -> &'static str {
        "Capture"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let snapshot = style::capture(context.element());
        log::trace!("Captured style snapshot: {snapshot:?}");
        context.set_snapshot(snapshot);
        Ok(context)
    }
}

struct TokenizeStage;
impl Stage for TokenizeStage {
    fn name(&self) -> &'static str {
        "Tokenize"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let tokenizer = context
            .tokenizer()
            .ok_or_else(|| SnipError::Pipeline("No tokenizer configured".into()))?;

        tokenizer.ensure_ready();
        let params = context.params();
        log::debug!(
            "Tokenizing {} bytes as {:?} with backend: {}",
            params.source_text.len(),
            params.language_tag,
            tokenizer.name()
        );
        let tokens = tokenizer.tokenize(&params.source_text, &params.language_tag);

        context.set_tokens(tokens);
        Ok(context)
    }
}

struct FlattenStage;
impl Stage for FlattenStage {
    fn name(&self) -> &'static str {
        "Flatten"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let tokens = context
            .tokens()
            .ok_or_else(|| SnipError::Pipeline("No tokens available".into()))?;

        let lines = flatten(tokens);
        log::debug!("Flattened into {} lines", lines.len());

        context.set_lines(lines);
        Ok(context)
    }
}

struct LayoutStage;
impl Stage for LayoutStage {
    fn name(&self) -> &'static str {
        "Layout"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let lines = context
            .lines()
            .ok_or_else(|| SnipError::Pipeline("No lines available".into()))?;
        let snapshot = context
            .snapshot()
            .ok_or_else(|| SnipError::Pipeline("No style snapshot captured".into()))?;

        let tree = layout::build(lines, context.colors(), snapshot, context.params());

        context.set_layout(tree);
        Ok(context)
    }
}

struct FontAcquisitionStage;
impl Stage for FontAcquisitionStage {
    fn name(&self) -> &'static str {
        "FontAcquisition"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let fonts = context
            .fonts()
            .ok_or_else(|| SnipError::Pipeline("No font provider configured".into()))?;

        log::debug!("Acquiring font with provider: {}", fonts.name());
        let font = fonts.acquire()?;
        log::debug!("Using font from {} ({} bytes)", font.origin, font.bytes.len());

        context.set_font(font);
        Ok(context)
    }
}

struct VectorizeStage;
impl Stage for VectorizeStage {
    fn name(&self) -> &'static str {
        "Vectorize"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let vectorizer = context
            .vectorizer()
            .ok_or_else(|| SnipError::Pipeline("No vector renderer configured".into()))?;
        let tree = context
            .layout()
            .ok_or_else(|| SnipError::Pipeline("No layout available".into()))?;
        let font = context
            .font()
            .ok_or_else(|| SnipError::Pipeline("No font acquired".into()))?;

        log::debug!("Vectorizing with backend: {}", vectorizer.name());
        let document = vectorizer.render(tree, font)?;

        context.set_document(document);
        Ok(context)
    }
}

struct RasterizeStage;
impl Stage for RasterizeStage {
    fn name(&self) -> &'static str {
        "Rasterize"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let rasterizer = context
            .rasterizer()
            .ok_or_else(|| SnipError::Pipeline("No rasterizer configured".into()))?;
        let document = context
            .document()
            .ok_or_else(|| SnipError::Pipeline("No vector document available".into()))?;
        let font = context
            .font()
            .ok_or_else(|| SnipError::Pipeline("No font acquired".into()))?;
        let scale = context.params().pixel_scale;

        rasterizer.ensure_ready()?;
        log::debug!(
            "Rasterizing {}x{} at {} with backend: {}",
            document.width,
            document.height,
            scale,
            rasterizer.name()
        );
        let bitmap = rasterizer.rasterize(document, font, scale)?;

        let expected = (document.width * scale.factor(), document.height * scale.factor());
        if (bitmap.width, bitmap.height) != expected {
            return Err(RenderError::InvalidDimensions {
                width: bitmap.width,
                height: bitmap.height,
            }
            .into());
        }

        context.set_bitmap(bitmap);
        Ok(context)
    }
}

struct EncodeStage;
impl Stage for EncodeStage {
    fn name(&self) -> &'static str {
        "Encode"
    }

    fn process(&self, mut context: ExportContext) -> Result<ExportContext> {
        let encoder = context
            .encoder()
            .ok_or_else(|| SnipError::Pipeline("No encoder configured".into()))?;
        let bitmap = context
            .bitmap()
            .ok_or_else(|| SnipError::Pipeline("No bitmap available".into()))?;

        log::debug!("Encoding with backend: {}", encoder.name());
        let encoded = encoder.encode(bitmap)?;

        context.set_encoded(encoded);
        Ok(context)
    }
}
