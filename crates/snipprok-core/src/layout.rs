//! Layout building: rows of segments become a positioned, styled tree
//!
//! The tree is plain data. Every node carries absolute coordinates, so the
//! vector renderer only has to draw. Sizes come from the export parameters
//! and fixed constants, never from measuring the live preview, which keeps
//! the output identical for identical input.

use crate::{
    color,
    style::StyleSnapshot,
    theme::ColorTable,
    types::Line,
    ExportParameters,
};

/// Padding inside the code panel
pub const INNER_PADDING: f32 = 24.0;
/// Line box height as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.5;
/// One pixel of panel border at the top and one at the bottom
pub const BORDER_CONTRIBUTION: f32 = 2.0;

pub const PANEL_BACKGROUND: &str = "rgb(23, 23, 23)";
pub const PANEL_BORDER: &str = "rgb(64, 64, 64)";
pub const PANEL_BORDER_WIDTH: f32 = 1.0;
pub const PANEL_RADIUS: f32 = 12.0;

pub const GLOW_OPACITY: f32 = 0.15;
pub const GLOW_WIDTH_RATIO: f32 = 0.9;
pub const GLOW_ASPECT: f32 = 16.0 / 9.0;
pub const GLOW_BLUR: f32 = 40.0;

/// Amber → lime → emerald → sky → purple → rose
pub const GRADIENT_STOPS: [(f32, &str); 6] = [
    (0.0135, "#f59e0b"),
    (0.1848, "#a3e635"),
    (0.3835, "#34d399"),
    (0.5863, "#0ea5e9"),
    (0.797, "#a855f7"),
    (1.0, "#f43f5e"),
];

/// Absolute placement in card pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { radius: f32 },
    Ellipse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    None,
    Solid(String),
    /// Left-to-right ramp across the node's frame
    LinearGradient(Vec<GradientStop>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub color: String,
    pub width: f32,
}

/// A box that draws itself and holds children
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub frame: Rect,
    pub shape: Shape,
    pub fill: Fill,
    pub border: Option<Border>,
    pub opacity: f32,
    /// Gaussian blur standard deviation, zero for none
    pub blur: f32,
    /// Base color for runs inside this container
    pub text_color: Option<String>,
    pub children: Vec<LayoutNode>,
}

/// One line of code
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub frame: Rect,
    pub runs: Vec<Run>,
}

/// One segment of text in its resolved color
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Container(Container),
    Row(Row),
}

/// Everything the vector renderer needs for one card
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    pub width: u32,
    pub height: u32,
    pub font_size: f32,
    pub line_height: f32,
    pub root: LayoutNode,
}

impl LayoutTree {
    pub fn rows(&self) -> Vec<&Row> {
        let mut rows = Vec::new();
        collect_rows(&self.root, &mut rows);
        rows
    }
}

fn collect_rows<'a>(node: &'a LayoutNode, rows: &mut Vec<&'a Row>) {
    match node {
        LayoutNode::Row(row) => rows.push(row),
        LayoutNode::Container(container) => {
            for child in &container.children {
                collect_rows(child, rows);
            }
        },
    }
}

/// Card size for a line count: `(width, height)` in pixels
pub fn card_size(line_count: usize, snapshot: &StyleSnapshot, params: &ExportParameters) -> (u32, u32) {
    let width = snapshot
        .box_width
        .unwrap_or(params.width_px as f32)
        .ceil();
    let line_height = params.font_size_px as f32 * LINE_HEIGHT_FACTOR;
    let height = 2.0 * params.outer_padding_px as f32
        + 2.0 * INNER_PADDING
        + BORDER_CONTRIBUTION
        + line_count as f32 * line_height;
    (width as u32, height.ceil() as u32)
}

/// Assemble the card: background, decorative glow, code panel
pub fn build(
    lines: &[Line],
    colors: &ColorTable,
    snapshot: &StyleSnapshot,
    params: &ExportParameters,
) -> LayoutTree {
    let (width, height) = card_size(lines.len(), snapshot, params);
    let (w, h) = (width as f32, height as f32);
    let font_size = params.font_size_px as f32;
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let outer = params.outer_padding_px as f32;

    let glow_width = w * GLOW_WIDTH_RATIO;
    let glow_height = glow_width / GLOW_ASPECT;
    let glow = Container {
        frame: Rect {
            x: (w - glow_width) / 2.0,
            y: (h - glow_height) / 2.0,
            width: glow_width,
            height: glow_height,
        },
        shape: Shape::Ellipse,
        fill: Fill::LinearGradient(
            GRADIENT_STOPS
                .iter()
                .map(|(offset, value)| GradientStop {
                    offset: *offset,
                    color: color::normalize(value),
                })
                .collect(),
        ),
        border: None,
        opacity: GLOW_OPACITY,
        blur: GLOW_BLUR,
        text_color: None,
        children: Vec::new(),
    };

    let content_x = outer + PANEL_BORDER_WIDTH + INNER_PADDING;
    let content_y = outer + PANEL_BORDER_WIDTH + INNER_PADDING;
    let content_width = (w - 2.0 * content_x).max(0.0);

    let rows = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            LayoutNode::Row(Row {
                frame: Rect {
                    x: content_x,
                    y: content_y + index as f32 * line_height,
                    width: content_width,
                    height: line_height,
                },
                runs: line
                    .segments
                    .iter()
                    .filter(|segment| !segment.text.is_empty())
                    .map(|segment| Run {
                        text: segment.text.clone(),
                        color: colors.resolve(&segment.types).to_string(),
                    })
                    .collect(),
            })
        })
        .collect();

    let base_text = snapshot
        .text_color
        .clone()
        .unwrap_or_else(|| colors.default_color().to_string());

    let panel = Container {
        frame: Rect {
            x: outer,
            y: outer,
            width: (w - 2.0 * outer).max(0.0),
            height: (h - 2.0 * outer).max(0.0),
        },
        shape: Shape::Rect {
            radius: PANEL_RADIUS,
        },
        fill: Fill::Solid(color::normalize(PANEL_BACKGROUND)),
        border: Some(Border {
            color: color::normalize(PANEL_BORDER),
            width: PANEL_BORDER_WIDTH,
        }),
        opacity: 1.0,
        blur: 0.0,
        text_color: Some(base_text),
        children: rows,
    };

    let card = Container {
        frame: Rect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
        },
        shape: Shape::Rect { radius: 0.0 },
        fill: Fill::Solid(color::normalize(&params.background_color)),
        border: None,
        opacity: 1.0,
        blur: 0.0,
        text_color: None,
        children: vec![LayoutNode::Container(glow), LayoutNode::Container(panel)],
    };

    log::debug!(
        "layout: {} rows, card {}x{} at {}px/{}px",
        lines.len(),
        width,
        height,
        font_size,
        line_height
    );

    LayoutTree {
        width,
        height,
        font_size,
        line_height,
        root: LayoutNode::Container(card),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use crate::types::Segment;

    fn line(parts: &[(&str, &[&str])]) -> Line {
        Line {
            segments: parts
                .iter()
                .map(|(text, types)| Segment {
                    text: text.to_string(),
                    types: types.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        }
    }

    fn params(font: u32, padding: u32, width: u32) -> ExportParameters {
        ExportParameters {
            font_size_px: font,
            outer_padding_px: padding,
            width_px: width,
            ..ExportParameters::default()
        }
    }

    #[test]
    fn test_height_formula() {
        let lines = vec![Line::default(); 10];
        let (w, h) = card_size(lines.len(), &StyleSnapshot::default(), &params(14, 20, 640));
        assert_eq!((w, h), (640, 300));
    }

    #[test]
    fn test_height_rounds_up() {
        // 2*0 + 48 + 2 + 3 * 13 * 1.5 = 108.5
        let (_, h) = card_size(3, &StyleSnapshot::default(), &params(13, 0, 640));
        assert_eq!(h, 109);
    }

    #[test]
    fn test_width_comes_from_element_box() {
        let snapshot = StyleSnapshot {
            box_width: Some(700.2),
            ..StyleSnapshot::default()
        };
        let (w, _) = card_size(1, &snapshot, &params(14, 32, 640));
        assert_eq!(w, 701);
    }

    #[test]
    fn test_tree_has_three_layers_and_colored_runs() {
        let table = Theme::dark().color_table();
        let lines = vec![
            line(&[("fn", &["keyword"]), ("\u{a0}main", &[])]),
            line(&[("//\u{a0}hi", &["comment"])]),
        ];
        let tree = build(&lines, &table, &StyleSnapshot::default(), &params(16, 32, 640));

        let LayoutNode::Container(card) = &tree.root else {
            unreachable!("root is a container");
        };
        assert_eq!(card.fill, Fill::Solid("rgba(11,11,15,1)".into()));
        assert_eq!(card.children.len(), 2);

        let LayoutNode::Container(glow) = &card.children[0] else {
            unreachable!("glow is a container");
        };
        assert_eq!(glow.shape, Shape::Ellipse);
        assert_eq!(glow.opacity, GLOW_OPACITY);
        assert!((glow.frame.width - 576.0).abs() < 1e-3);
        assert!((glow.frame.height - 324.0).abs() < 1e-3);

        let LayoutNode::Container(panel) = &card.children[1] else {
            unreachable!("panel is a container");
        };
        assert_eq!(panel.fill, Fill::Solid("rgba(23,23,23,1)".into()));
        assert_eq!(panel.text_color.as_deref(), Some(table.default_color()));

        let rows = tree.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].runs[0].color, table.get("keyword").unwrap());
        assert_eq!(rows[0].runs[1].color, table.default_color());
        assert_eq!(rows[1].runs[0].color, table.get("comment").unwrap());
        assert_eq!(rows[1].frame.y - rows[0].frame.y, 24.0);
        assert_eq!(rows[0].frame.x, 32.0 + 1.0 + 24.0);
    }

    #[test]
    fn test_snapshot_text_color_is_panel_base() {
        let table = Theme::dark().color_table();
        let snapshot = StyleSnapshot {
            text_color: Some("rgba(1,2,3,1)".into()),
            ..StyleSnapshot::default()
        };
        let tree = build(&[], &table, &snapshot, &params(14, 0, 320));
        let LayoutNode::Container(card) = &tree.root else {
            unreachable!("root is a container");
        };
        let LayoutNode::Container(panel) = &card.children[1] else {
            unreachable!("panel is a container");
        };
        assert_eq!(panel.text_color.as_deref(), Some("rgba(1,2,3,1)"));
        assert!(tree.rows().is_empty());
        assert_eq!(tree.height, 50);
    }
}
