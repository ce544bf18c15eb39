//! SVG Renderer: layout trees become vector documents
//!
//! Every container becomes a shape, every row a `<text>` element with one
//! `<tspan>` per run. Coordinates are taken as-is from the layout tree.
//! The document names the embedded font's family; the rasterizer is handed
//! the same bytes, so nothing depends on what is installed.
//!
//! ## How it works
//!
//! 1. Reads family and vertical metrics from the font with read-fonts
//! 2. Walks the tree, collecting gradients and blur filters into `<defs>`
//! 3. Places each row's baseline so glyphs sit centered in the line box
//! 4. Returns the finished document with its pixel size

use std::fmt::{self, Write as FmtWrite};

use snipprok_core::{
    color,
    error::{RenderError, Result},
    layout::{Container, Fill, LayoutNode, LayoutTree, Row, Shape},
    traits::VectorRenderer,
    types::{FontData, VectorDocument},
};
use snipprok_fontdb::FontInfo;

/// Family and vertical metrics, in ems
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    pub family: String,
    pub ascent: f32,
    pub descent: f32,
}

impl TextMetrics {
    pub fn from_font(font: &FontData) -> Result<Self> {
        let info = FontInfo::read(font)?;
        let (ascent, descent) = (info.ascent_ratio(), info.descent_ratio());
        Ok(Self {
            family: info.family.unwrap_or_else(|| "monospace".to_string()),
            ascent,
            descent,
        })
    }

    /// Baseline y for a line box starting at `top`
    pub fn baseline(&self, top: f32, line_height: f32, font_size: f32) -> f32 {
        let content = (self.ascent + self.descent) * font_size;
        top + (line_height - content) / 2.0 + self.ascent * font_size
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            family: "monospace".to_string(),
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

/// Layout tree → SVG
#[derive(Debug, Default, Clone)]
pub struct SvgRenderer {
    family_override: Option<String>,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name a different family in the document than the font reports
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family_override = Some(family.into());
        self
    }

    /// Render with metrics already at hand
    pub fn render_with_metrics(
        &self,
        layout: &LayoutTree,
        metrics: &TextMetrics,
    ) -> Result<VectorDocument> {
        if layout.width == 0 || layout.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: layout.width,
                height: layout.height,
            }
            .into());
        }

        let mut writer = SvgWriter::new(layout, metrics);
        writer.node(&layout.root, None)?;
        let svg = writer.finish()?;

        log::debug!(
            "SvgRenderer: {}x{} document, {} bytes",
            layout.width,
            layout.height,
            svg.len()
        );

        Ok(VectorDocument {
            svg,
            width: layout.width,
            height: layout.height,
        })
    }
}

impl VectorRenderer for SvgRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn render(&self, layout: &LayoutTree, font: &FontData) -> Result<VectorDocument> {
        let mut metrics = TextMetrics::from_font(font)?;
        if let Some(family) = &self.family_override {
            metrics.family = family.clone();
        }
        self.render_with_metrics(layout, &metrics)
    }
}

struct SvgWriter<'a> {
    layout: &'a LayoutTree,
    metrics: &'a TextMetrics,
    defs: String,
    body: String,
    next_id: usize,
}

impl<'a> SvgWriter<'a> {
    fn new(layout: &'a LayoutTree, metrics: &'a TextMetrics) -> Self {
        Self {
            layout,
            metrics,
            defs: String::new(),
            body: String::new(),
            next_id: 0,
        }
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn node(&mut self, node: &LayoutNode, text_color: Option<&str>) -> std::result::Result<(), RenderError> {
        match node {
            LayoutNode::Container(container) => self.container(container, text_color)?,
            LayoutNode::Row(row) => self.row(row, text_color)?,
        }
        Ok(())
    }

    fn container(&mut self, container: &Container, inherited: Option<&str>) -> fmt::Result {
        let frame = container.frame;
        let border = container.border.as_ref().filter(|border| border.width > 0.0);
        let visible = frame.width > 0.0
            && frame.height > 0.0
            && (!matches!(container.fill, Fill::None) || border.is_some());

        if visible {
            let fill = match &container.fill {
                Fill::None => r#"fill="none""#.to_string(),
                Fill::Solid(value) => paint_attrs("fill", value),
                Fill::LinearGradient(stops) => {
                    let id = self.id("gradient");
                    writeln!(
                        self.defs,
                        r#"    <linearGradient id="{id}" x1="0" y1="0" x2="1" y2="0">"#
                    )?;
                    for stop in stops {
                        let (hex, alpha) = paint(&stop.color);
                        writeln!(
                            self.defs,
                            r#"      <stop offset="{}" stop-color="{hex}" stop-opacity="{}"/>"#,
                            num(stop.offset),
                            num(alpha)
                        )?;
                    }
                    writeln!(self.defs, "    </linearGradient>")?;
                    format!(r#"fill="url(#{id})""#)
                },
            };

            let mut extra = String::new();
            if let Some(border) = border {
                write!(
                    extra,
                    r#" {} stroke-width="{}""#,
                    paint_attrs("stroke", &border.color),
                    num(border.width)
                )?;
            }
            if container.opacity < 1.0 {
                write!(extra, r#" opacity="{}""#, num(container.opacity.max(0.0)))?;
            }
            if container.blur > 0.0 {
                let id = self.id("blur");
                writeln!(
                    self.defs,
                    r#"    <filter id="{id}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{}"/></filter>"#,
                    num(container.blur)
                )?;
                write!(extra, r#" filter="url(#{id})""#)?;
            }

            // Strokes straddle the path; inset so the border stays inside the frame
            let inset = border.map_or(0.0, |border| border.width / 2.0);
            match container.shape {
                Shape::Rect { radius } => {
                    let radius = (radius - inset).max(0.0);
                    writeln!(
                        self.body,
                        r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" {fill}{extra}/>"#,
                        num(frame.x + inset),
                        num(frame.y + inset),
                        num((frame.width - 2.0 * inset).max(0.0)),
                        num((frame.height - 2.0 * inset).max(0.0)),
                        r = num(radius),
                    )?;
                },
                Shape::Ellipse => {
                    writeln!(
                        self.body,
                        r#"  <ellipse cx="{}" cy="{}" rx="{}" ry="{}" {fill}{extra}/>"#,
                        num(frame.x + frame.width / 2.0),
                        num(frame.y + frame.height / 2.0),
                        num((frame.width / 2.0 - inset).max(0.0)),
                        num((frame.height / 2.0 - inset).max(0.0)),
                    )?;
                },
            }
        }

        let text_color = container.text_color.as_deref().or(inherited);
        for child in &container.children {
            match child {
                LayoutNode::Container(inner) => self.container(inner, text_color)?,
                LayoutNode::Row(row) => self.row(row, text_color)?,
            }
        }
        Ok(())
    }

    fn row(&mut self, row: &Row, text_color: Option<&str>) -> fmt::Result {
        if row.runs.is_empty() {
            return Ok(());
        }

        let font_size = self.layout.font_size;
        let baseline = self
            .metrics
            .baseline(row.frame.y, row.frame.height, font_size);
        let base = text_color.unwrap_or(color::TRANSPARENT_BLACK);

        write!(
            self.body,
            r#"  <text x="{}" y="{}" font-family="{}" font-size="{}" {} xml:space="preserve">"#,
            num(row.frame.x),
            num(baseline),
            escape(&format!("'{}', monospace", self.metrics.family)),
            num(font_size),
            paint_attrs("fill", base)
        )?;
        for run in &row.runs {
            write!(
                self.body,
                "<tspan {}>{}</tspan>",
                paint_attrs("fill", &run.color),
                escape(&run.text)
            )?;
        }
        writeln!(self.body, "</text>")
    }

    fn finish(self) -> std::result::Result<String, RenderError> {
        let (width, height) = (self.layout.width, self.layout.height);
        let mut svg = String::with_capacity(self.defs.len() + self.body.len() + 256);

        writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        if !self.defs.is_empty() {
            writeln!(svg, "  <defs>")?;
            svg.push_str(&self.defs);
            writeln!(svg, "  </defs>")?;
        }
        svg.push_str(&self.body);
        writeln!(svg, "</svg>")?;
        Ok(svg)
    }
}

/// `#rrggbb` and alpha for a canonical color
fn paint(value: &str) -> (String, f32) {
    let rgba = color::parse(value).unwrap_or(color::Rgba::transparent());
    (rgba.to_hex(), rgba.a)
}

fn paint_attrs(property: &str, value: &str) -> String {
    let (hex, alpha) = paint(value);
    if alpha >= 1.0 {
        format!(r#"{property}="{hex}""#)
    } else {
        format!(r#"{property}="{hex}" {property}-opacity="{}""#, num(alpha))
    }
}

/// Up to two decimals, trailing zeros trimmed
fn num(value: f32) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// XML text escaping; code points XML 1.0 cannot carry are dropped
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().filter(|&ch| is_xml_char(ch)) {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r') || (ch >= ' ' && ch != '\u{fffe}' && ch != '\u{ffff}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipprok_core::{
        flatten::flatten,
        layout,
        style::StyleSnapshot,
        types::Token,
        ExportParameters, Theme,
    };

    fn tree(tokens: &[Token]) -> LayoutTree {
        let params = ExportParameters {
            font_size_px: 14,
            outer_padding_px: 20,
            width_px: 640,
            ..ExportParameters::default()
        };
        layout::build(
            &flatten(tokens),
            &Theme::dark().color_table(),
            &StyleSnapshot::default(),
            &params,
        )
    }

    fn render(tokens: &[Token]) -> VectorDocument {
        match SvgRenderer::new().render_with_metrics(&tree(tokens), &TextMetrics::default()) {
            Ok(document) => document,
            Err(e) => unreachable!("render failed: {e}"),
        }
    }

    #[test]
    fn test_renderer_name() {
        assert_eq!(SvgRenderer::new().name(), "svg");
    }

    #[test]
    fn test_document_has_size_and_layers() {
        let document = render(&[Token::text("a\nb")]);
        assert_eq!((document.width, document.height), (640, 132));
        assert!(document.svg.contains(r#"width="640" height="132""#));
        assert_eq!(document.svg.matches("<stop ").count(), 6);
        assert!(document.svg.contains("<feGaussianBlur"));
        assert!(document.svg.contains("<ellipse"));
        assert!(document.svg.contains(r#"opacity="0.15""#));
        assert_eq!(document.svg.matches("<text ").count(), 2);
    }

    #[test]
    fn test_runs_keep_their_colors() {
        let table = Theme::dark().color_table();
        let keyword = paint(table.get("keyword").unwrap_or_default()).0;
        let document = render(&[Token::leaf("keyword", "let"), Token::text(" x")]);
        assert!(
            document.svg.contains(&format!(r#"<tspan fill="{keyword}">let</tspan>"#)),
            "{}",
            document.svg
        );
    }

    #[test]
    fn test_markup_is_escaped() {
        let document = render(&[Token::text("if a < b && c > \"d\"")]);
        assert!(document.svg.contains("a\u{a0}&lt;\u{a0}b\u{a0}&amp;&amp;\u{a0}c\u{a0}&gt;"));
        assert!(document.svg.contains("&quot;d&quot;"));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let document = render(&[Token::text("int a;\x0cint b;\necho \x1b[31mred\u{ffff}")]);
        assert!(!document.svg.contains('\x0c'));
        assert!(!document.svg.contains('\x1b'));
        assert!(!document.svg.contains('\u{ffff}'));
        assert!(document.svg.contains("int\u{a0}a;int\u{a0}b;"));
        assert!(document.svg.contains("echo\u{a0}[31mred"));
        assert_eq!(escape("\u{7}bell\u{fffd}"), "bell\u{fffd}");
    }

    #[test]
    fn test_empty_rows_emit_no_text() {
        let document = render(&[Token::text("a\n\nb")]);
        assert_eq!(document.svg.matches("<text ").count(), 2);
    }

    #[test]
    fn test_baseline_centers_glyphs_in_line_box() {
        let metrics = TextMetrics::default();
        // (21 - 14) / 2 + 0.8 * 14
        assert!((metrics.baseline(100.0, 21.0, 14.0) - 114.7).abs() < 1e-4);
    }

    #[test]
    fn test_translucent_colors_get_opacity() {
        assert_eq!(paint_attrs("fill", "rgba(255,0,0,0.5)"), r##"fill="#ff0000" fill-opacity="0.5""##);
        assert_eq!(paint_attrs("fill", "rgba(0,0,0,1)"), r##"fill="#000000""##);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(0.15), "0.15");
        assert_eq!(num(14.7), "14.7");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn test_family_override() {
        let renderer = SvgRenderer::new().with_family("Fira Code");
        assert_eq!(renderer.family_override.as_deref(), Some("Fira Code"));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut layout = tree(&[]);
        layout.width = 0;
        assert!(SvgRenderer::new()
            .render_with_metrics(&layout, &TextMetrics::default())
            .is_err());
    }
}
