//! Style capture from the rendered snippet
//!
//! The editor shell hands over its rendered code block as a tree of
//! [`RenderedElement`]s carrying computed style values. Capture walks the
//! same wrapper → body → code structure the preview produces and records a
//! [`StyleSnapshot`]. Every color read goes through [`crate::color::normalize`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{color, theme::BlockStyle, ExportParameters};

pub const DEFAULT_PADDING: f32 = 16.0;
pub const DEFAULT_BORDER_RADIUS: f32 = 8.0;
pub const DEFAULT_BORDER_WIDTH: f32 = 1.0;

/// Class the preview puts on the element that carries the code padding
pub const BODY_CLASS: &str = "code-block-body";

/// One element of the rendered preview with its computed style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedElement {
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Computed CSS property → value, e.g. `padding-top` → `16px`
    #[serde(default)]
    pub computed: BTreeMap<String, String>,
    /// Laid-out border-box width in CSS pixels
    #[serde(default)]
    pub box_width: Option<f32>,
    #[serde(default)]
    pub children: Vec<RenderedElement>,
}

impl RenderedElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.computed.insert(property.into(), value.into());
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.box_width = Some(width);
        self
    }

    pub fn with_child(mut self, child: RenderedElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.computed
            .get(property)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The element tree the preview renders for a snippet
    ///
    /// wrapper (border, radius, background) → `pre` body (padding) → `code`
    pub fn code_block(block: &BlockStyle, params: &ExportParameters) -> Self {
        let code = RenderedElement::new("code")
            .with_style("color", block.text_color.clone())
            .with_style("font-size", format!("{}px", params.font_size_px));

        let body = RenderedElement::new("pre")
            .with_class(BODY_CLASS)
            .with_style("padding", format!("{}px", block.padding))
            .with_style("background-color", block.background.clone())
            .with_child(code);

        RenderedElement::new("div")
            .with_class("code-block")
            .with_style("border-width", format!("{}px", block.border_width))
            .with_style("border-color", block.border_color.clone())
            .with_style("border-radius", format!("{}px", block.border_radius))
            .with_style("background-color", block.background.clone())
            .with_width(params.width_px as f32)
            .with_child(body)
    }

    /// Deepest `code` element, depth-first
    fn innermost_code(&self) -> Option<&RenderedElement> {
        let nested = self.children.iter().find_map(RenderedElement::innermost_code);
        match nested {
            Some(found) => Some(found),
            None if self.tag.eq_ignore_ascii_case("code") => Some(self),
            None => None,
        }
    }

    /// The element wrapping the code content: marked body class, else `pre`
    fn body(&self) -> Option<&RenderedElement> {
        self.find(&|el| el.has_class(BODY_CLASS))
            .or_else(|| self.find(&|el| el.tag.eq_ignore_ascii_case("pre")))
    }

    fn find(&self, predicate: &dyn Fn(&RenderedElement) -> bool) -> Option<&RenderedElement> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }
}

/// Per-side pixel values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Presentation values read once per export, read-only afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSnapshot {
    pub padding: Edges,
    pub background_color: String,
    pub border_color: String,
    pub border_width: f32,
    pub border_radius: f32,
    /// Computed text color of the code element, when present
    pub text_color: Option<String>,
    /// Border-box width of the outermost element, when laid out
    pub box_width: Option<f32>,
}

impl Default for StyleSnapshot {
    fn default() -> Self {
        Self {
            padding: Edges::uniform(DEFAULT_PADDING),
            background_color: color::TRANSPARENT_BLACK.to_string(),
            border_color: color::TRANSPARENT_BLACK.to_string(),
            border_width: DEFAULT_BORDER_WIDTH,
            border_radius: DEFAULT_BORDER_RADIUS,
            text_color: None,
            box_width: None,
        }
    }
}

/// Read the snapshot from a rendered code block
///
/// Missing structure falls back to the outermost element; missing values
/// fall back to the defaults above.
pub fn capture(root: &RenderedElement) -> StyleSnapshot {
    let code = root.innermost_code();
    let body = match (root.body(), code) {
        (Some(body), Some(_)) => body,
        _ => {
            log::debug!("code block structure not found, reading styles from the outer element");
            root
        },
    };

    let padding = read_padding(body);
    let background_color = body
        .style("background-color")
        .or_else(|| root.style("background-color"))
        .map(color::normalize)
        .unwrap_or_else(|| color::TRANSPARENT_BLACK.to_string());

    let border_color = root
        .style("border-color")
        .or_else(|| root.style("border-top-color"))
        .map(color::normalize)
        .unwrap_or_else(|| color::TRANSPARENT_BLACK.to_string());

    let border_width = root
        .style("border-top-width")
        .or_else(|| root.style("border-width"))
        .and_then(parse_px)
        .unwrap_or(DEFAULT_BORDER_WIDTH);

    let border_radius = root
        .style("border-radius")
        .and_then(parse_radius)
        .unwrap_or(DEFAULT_BORDER_RADIUS);

    let text_color = code.and_then(|el| el.style("color")).map(color::normalize);

    StyleSnapshot {
        padding,
        background_color,
        border_color,
        border_width,
        border_radius,
        text_color,
        box_width: root.box_width.filter(|w| w.is_finite() && *w > 0.0),
    }
}

fn read_padding(element: &RenderedElement) -> Edges {
    let mut edges = element
        .style("padding")
        .and_then(parse_padding_shorthand)
        .unwrap_or(Edges::uniform(DEFAULT_PADDING));

    let longhands: [(&str, &mut f32); 4] = [
        ("padding-top", &mut edges.top),
        ("padding-right", &mut edges.right),
        ("padding-bottom", &mut edges.bottom),
        ("padding-left", &mut edges.left),
    ];
    for (property, slot) in longhands {
        if let Some(value) = element.style(property).and_then(parse_px) {
            *slot = value;
        }
    }
    edges
}

fn parse_padding_shorthand(value: &str) -> Option<Edges> {
    let parts: Option<Vec<f32>> = value.split_whitespace().map(parse_px).collect();
    match parts?.as_slice() {
        [all] => Some(Edges::uniform(*all)),
        [vertical, horizontal] => Some(Edges {
            top: *vertical,
            right: *horizontal,
            bottom: *vertical,
            left: *horizontal,
        }),
        [top, horizontal, bottom] => Some(Edges {
            top: *top,
            right: *horizontal,
            bottom: *bottom,
            left: *horizontal,
        }),
        [top, right, bottom, left] => Some(Edges {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        }),
        _ => None,
    }
}

/// `"16px"` or a bare number; other units are not pixel values
pub fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// First numeric component of a possibly compound radius (`8px / 4px` → 8)
pub fn parse_radius(value: &str) -> Option<f32> {
    value
        .split(|c: char| c.is_whitespace() || c == '/')
        .find(|part| !part.is_empty())
        .and_then(parse_px)
}
