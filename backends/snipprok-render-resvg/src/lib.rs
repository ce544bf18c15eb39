//! resvg Rasterizer: vector documents become straight-alpha pixels
//!
//! The document is parsed by usvg against a font database holding only the
//! export's font, so output never depends on what the machine has installed.
//! Pixel density is applied as a transform; nothing is laid out twice.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use snipprok_core::{
    error::{RenderError, Result},
    traits::Rasterizer,
    types::{BitmapData, FontData, VectorDocument},
    PixelScale,
};
use tiny_skia::{Pixmap, Transform};

/// Tiny document rendered once to prove the backend works
const WARMUP_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"><rect width="2" height="2" fill="#000"/></svg>"##;

static WARMED_UP: OnceCell<()> = OnceCell::new();

/// Rasterizer backed by resvg and tiny-skia
#[derive(Debug, Default, Clone, Copy)]
pub struct ResvgRasterizer;

impl ResvgRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for ResvgRasterizer {
    fn name(&self) -> &'static str {
        "resvg"
    }

    fn ensure_ready(&self) -> Result<()> {
        WARMED_UP
            .get_or_try_init(|| -> Result<()> {
                log::debug!("warming up resvg");
                let tree = usvg::Tree::from_str(WARMUP_SVG, &usvg::Options::default())
                    .map_err(|e| RenderError::BackendUnavailable(e.to_string()))?;
                let mut pixmap = Pixmap::new(2, 2).ok_or_else(|| {
                    RenderError::BackendUnavailable("cannot allocate a pixmap".into())
                })?;
                resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
                Ok(())
            })
            .copied()
    }

    fn rasterize(
        &self,
        document: &VectorDocument,
        font: &FontData,
        scale: PixelScale,
    ) -> Result<BitmapData> {
        let factor = scale.factor();
        let width = document.width.saturating_mul(factor);
        let height = document.height.saturating_mul(factor);
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height }.into());
        }

        let options = options_for(font);
        let tree = usvg::Tree::from_str(&document.svg, &options)
            .map_err(|e| RenderError::SvgParse(e.to_string()))?;

        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })?;
        let transform = Transform::from_scale(factor as f32, factor as f32);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        log::debug!("resvg: rasterized {width}x{height} at {scale}");

        Ok(BitmapData {
            width,
            height,
            data: demultiply(&pixmap),
        })
    }
}

/// usvg options whose only font is the export's font
fn options_for(font: &FontData) -> usvg::Options<'static> {
    let mut db = fontdb::Database::new();
    db.load_font_data(font.bytes.to_vec());

    let family = db
        .faces()
        .next()
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone());

    let mut options = usvg::Options::default();
    match family {
        Some(family) => {
            db.set_monospace_family(family.clone());
            db.set_sans_serif_family(family.clone());
            options.font_family = family;
        },
        None => log::warn!("resvg: {} holds no usable face", font.origin),
    }
    options.fontdb = Arc::new(db);
    options
}

/// tiny-skia stores premultiplied pixels; bitmaps carry straight alpha
fn demultiply(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(svg: &str, width: u32, height: u32) -> VectorDocument {
        VectorDocument {
            svg: svg.to_string(),
            width,
            height,
        }
    }

    fn no_font() -> FontData {
        FontData::new(Vec::new(), "none")
    }

    #[test]
    fn test_rasterizer_name() {
        assert_eq!(ResvgRasterizer::new().name(), "resvg");
    }

    #[test]
    fn test_warmup_is_idempotent() {
        let rasterizer = ResvgRasterizer::new();
        assert!(rasterizer.ensure_ready().is_ok());
        assert!(rasterizer.ensure_ready().is_ok());
        assert!(WARMED_UP.get().is_some());
    }

    #[test]
    fn test_scale_multiplies_dimensions() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="640" height="300"><rect width="640" height="300" fill="#ff0000"/></svg>"##;
        let bitmap = match ResvgRasterizer::new().rasterize(&document(svg, 640, 300), &no_font(), PixelScale::X3) {
            Ok(bitmap) => bitmap,
            Err(e) => unreachable!("rasterize failed: {e}"),
        };
        assert_eq!((bitmap.width, bitmap.height), (1920, 900));
        assert_eq!(bitmap.data.len(), 1920 * 900 * 4);
        assert_eq!(&bitmap.data[..4], &[255, 0, 0, 255]);
        let last = bitmap.data.len() - 4;
        assert_eq!(&bitmap.data[last..], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_translucent_pixels_are_straight_alpha() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#ff0000" fill-opacity="0.5"/></svg>"##;
        let bitmap = match ResvgRasterizer::new().rasterize(&document(svg, 4, 4), &no_font(), PixelScale::X1) {
            Ok(bitmap) => bitmap,
            Err(e) => unreachable!("rasterize failed: {e}"),
        };
        let [r, g, b, a] = [bitmap.data[0], bitmap.data[1], bitmap.data[2], bitmap.data[3]];
        assert_eq!((g, b), (0, 0));
        assert!(r >= 250, "red should be restored, got {r}");
        assert!((126..=129).contains(&a), "alpha {a}");
    }

    #[test]
    fn test_malformed_svg_is_rejected() {
        let result = ResvgRasterizer::new().rasterize(&document("<svg", 10, 10), &no_font(), PixelScale::X1);
        assert!(matches!(
            result,
            Err(snipprok_core::SnipError::RenderingFailed(RenderError::SvgParse(_)))
        ));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;
        let result = ResvgRasterizer::new().rasterize(&document(svg, 0, 10), &no_font(), PixelScale::X2);
        assert!(matches!(
            result,
            Err(snipprok_core::SnipError::RenderingFailed(RenderError::InvalidDimensions { .. }))
        ));
    }
}
