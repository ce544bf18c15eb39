//! Color normalization
//!
//! Any color expression the editor or a theme may carry ends up as one
//! canonical string: `rgba(r,g,b,a)` with integer channels in 0..=255 and
//! alpha in 0..=1 rounded to two decimals. Classic CSS notations go through
//! `svgtypes`; `oklab()`, `oklch()`, `lab()`, `lch()` and `color()` are
//! converted to sRGB here and clamped to gamut.
//!
//! Invalid input never fails: it normalizes to transparent black.

use std::str::FromStr;

/// Canonical value for anything that does not parse
pub const TRANSPARENT_BLACK: &str = "rgba(0,0,0,0)";

/// A resolved sRGB color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Always a multiple of 0.01
    pub a: f32,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: round_alpha(a),
        }
    }

    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        }
    }

    /// `rgba(r,g,b,a)` with alpha trimmed of trailing zeros
    pub fn to_canonical(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, format_alpha(self.a))
    }

    /// `#rrggbb`, alpha dropped
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::transparent()
    }
}

/// Normalize a color expression to its canonical string
///
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(input: &str) -> String {
    match parse(input) {
        Some(color) => color.to_canonical(),
        None => {
            log::trace!("color {input:?} did not parse, using transparent black");
            TRANSPARENT_BLACK.to_string()
        },
    }
}

/// Parse a color expression, `None` when it is not a color
pub fn parse(input: &str) -> Option<Rgba> {
    let value = input.trim().to_ascii_lowercase();
    if value.is_empty() {
        return None;
    }
    if value == "transparent" {
        return Some(Rgba::transparent());
    }

    if let Some((name, args)) = split_function(&value) {
        match name {
            "oklab" => return parse_oklab(args),
            "oklch" => return parse_oklch(args),
            "lab" => return parse_lab(args),
            "lch" => return parse_lch(args),
            "color" => return parse_color_function(args),
            _ => {},
        }
    }

    let parsed = svgtypes::Color::from_str(&value).ok()?;
    Some(Rgba::new(
        parsed.red,
        parsed.green,
        parsed.blue,
        parsed.alpha as f32 / 255.0,
    ))
}

fn split_function(value: &str) -> Option<(&str, &str)> {
    let open = value.find('(')?;
    let inner = value[open + 1..].strip_suffix(')')?;
    Some((value[..open].trim(), inner))
}

/// Channels and optional alpha of a CSS Color 4 function body
struct Components {
    values: Vec<String>,
    alpha: Option<String>,
}

fn split_components(args: &str) -> Option<Components> {
    let (channels, alpha) = match args.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha.trim().to_string())),
        None => (args, None),
    };
    let mut values: Vec<String> = channels
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    // Legacy comma form may carry alpha as a fourth channel
    let alpha = match (alpha, values.len()) {
        (None, 4) => values.pop(),
        (alpha, _) => alpha,
    };
    Some(Components { values, alpha })
}

/// A number, a percentage mapped onto `percent_scale`, or `none` (zero)
fn component(raw: &str, percent_scale: f64) -> Option<f64> {
    if raw == "none" {
        return Some(0.0);
    }
    if let Some(percent) = raw.strip_suffix('%') {
        return percent
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(|p| p / 100.0 * percent_scale);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn hue_degrees(raw: &str) -> Option<f64> {
    parse_hue(raw).filter(|h| h.is_finite())
}

fn parse_hue(raw: &str) -> Option<f64> {
    if raw == "none" {
        return Some(0.0);
    }
    if let Some(deg) = raw.strip_suffix("deg") {
        return deg.parse().ok();
    }
    if let Some(turn) = raw.strip_suffix("turn") {
        return turn.parse::<f64>().ok().map(|t| t * 360.0);
    }
    if let Some(grad) = raw.strip_suffix("grad") {
        return grad.parse::<f64>().ok().map(|g| g * 0.9);
    }
    if let Some(rad) = raw.strip_suffix("rad") {
        return rad.parse::<f64>().ok().map(f64::to_degrees);
    }
    raw.parse().ok()
}

fn alpha_of(components: &Components) -> Option<f64> {
    match &components.alpha {
        Some(raw) => component(raw, 1.0).map(|a| a.clamp(0.0, 1.0)),
        None => Some(1.0),
    }
}

fn three(components: &Components) -> Option<[&str; 3]> {
    match components.values.as_slice() {
        [a, b, c] => Some([a.as_str(), b.as_str(), c.as_str()]),
        _ => None,
    }
}

fn parse_oklab(args: &str) -> Option<Rgba> {
    let parts = split_components(args)?;
    let [l, a, b] = three(&parts)?;
    let lab = [component(l, 1.0)?, component(a, 0.4)?, component(b, 0.4)?];
    Some(from_linear_srgb(oklab_to_linear_srgb(lab), alpha_of(&parts)?))
}

fn parse_oklch(args: &str) -> Option<Rgba> {
    let parts = split_components(args)?;
    let [l, c, h] = three(&parts)?;
    let (l, c, h) = (component(l, 1.0)?, component(c, 0.4)?, hue_degrees(h)?);
    let (sin, cos) = h.to_radians().sin_cos();
    let lab = [l, c * cos, c * sin];
    Some(from_linear_srgb(oklab_to_linear_srgb(lab), alpha_of(&parts)?))
}

fn parse_lab(args: &str) -> Option<Rgba> {
    let parts = split_components(args)?;
    let [l, a, b] = three(&parts)?;
    let lab = [component(l, 100.0)?, component(a, 125.0)?, component(b, 125.0)?];
    Some(from_linear_srgb(cielab_to_linear_srgb(lab), alpha_of(&parts)?))
}

fn parse_lch(args: &str) -> Option<Rgba> {
    let parts = split_components(args)?;
    let [l, c, h] = three(&parts)?;
    let (l, c, h) = (component(l, 100.0)?, component(c, 150.0)?, hue_degrees(h)?);
    let (sin, cos) = h.to_radians().sin_cos();
    let lab = [l, c * cos, c * sin];
    Some(from_linear_srgb(cielab_to_linear_srgb(lab), alpha_of(&parts)?))
}

fn parse_color_function(args: &str) -> Option<Rgba> {
    let (space, rest) = args.trim().split_once(char::is_whitespace)?;
    let parts = split_components(rest)?;
    let [r, g, b] = three(&parts)?;
    let rgb = [component(r, 1.0)?, component(g, 1.0)?, component(b, 1.0)?];
    let alpha = alpha_of(&parts)?;
    let linear = match space {
        "srgb" => rgb.map(srgb_to_linear),
        "srgb-linear" => rgb,
        "display-p3" => {
            let xyz = mul3(&P3_TO_XYZ_D65, rgb.map(srgb_to_linear));
            mul3(&XYZ_D65_TO_LINEAR_SRGB, xyz)
        },
        _ => return None,
    };
    Some(from_linear_srgb(linear, alpha))
}

const XYZ_D65_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [3.240_969_941_904_522_6, -1.537_383_177_570_094, -0.498_610_760_293_003_4],
    [-0.969_243_636_280_879_6, 1.875_967_501_507_720_2, 0.041_555_057_407_175_59],
    [0.055_630_079_696_993_66, -0.203_976_958_888_976_52, 1.056_971_514_242_878_6],
];

const D50_TO_D65: [[f64; 3]; 3] = [
    [0.955_473_452_704_218_2, -0.023_098_536_874_261_423, 0.063_259_308_661_021_7],
    [-0.028_369_706_963_208_136, 1.009_995_458_010_662_9, 0.021_041_398_966_943_008],
    [0.012_314_001_688_319_899, -0.020_507_696_433_477_912, 1.330_365_936_608_075_3],
];

const P3_TO_XYZ_D65: [[f64; 3]; 3] = [
    [0.486_570_948_648_216_2, 0.265_667_693_169_093_06, 0.198_217_285_234_362_5],
    [0.228_974_564_069_748_8, 0.691_738_521_836_506_4, 0.079_286_914_093_745],
    [0.0, 0.045_113_381_858_902_64, 1.043_944_368_900_976],
];

const D50_WHITE: [f64; 3] = [0.964_220_9, 1.0, 0.825_188_3];

fn mul3(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn oklab_to_linear_srgb([l, a, b]: [f64; 3]) -> [f64; 3] {
    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548 * b;
    let (l3, m3, s3) = (l_.powi(3), m_.powi(3), s_.powi(3));
    [
        4.076_741_662_1 * l3 - 3.307_711_591_3 * m3 + 0.230_969_929_2 * s3,
        -1.268_438_004_6 * l3 + 2.609_757_401_1 * m3 - 0.341_319_396_5 * s3,
        -0.004_196_086_3 * l3 - 0.703_418_614_7 * m3 + 1.707_614_701 * s3,
    ]
}

fn cielab_to_linear_srgb([l, a, b]: [f64; 3]) -> [f64; 3] {
    const KAPPA: f64 = 24389.0 / 27.0;
    const EPSILON: f64 = 216.0 / 24389.0;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let xr = if fx.powi(3) > EPSILON {
        fx.powi(3)
    } else {
        (116.0 * fx - 16.0) / KAPPA
    };
    let yr = if l > KAPPA * EPSILON {
        fy.powi(3)
    } else {
        l / KAPPA
    };
    let zr = if fz.powi(3) > EPSILON {
        fz.powi(3)
    } else {
        (116.0 * fz - 16.0) / KAPPA
    };

    let xyz_d50 = [xr * D50_WHITE[0], yr * D50_WHITE[1], zr * D50_WHITE[2]];
    mul3(&XYZ_D65_TO_LINEAR_SRGB, mul3(&D50_TO_D65, xyz_d50))
}

fn srgb_to_linear(c: f64) -> f64 {
    let sign = c.signum();
    let abs = c.abs();
    if abs <= 0.040_45 {
        c / 12.92
    } else {
        sign * ((abs + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn from_linear_srgb(linear: [f64; 3], alpha: f64) -> Rgba {
    let [r, g, b] = linear.map(|c| {
        let encoded = linear_to_srgb(c).clamp(0.0, 1.0);
        (encoded * 255.0).round() as u8
    });
    Rgba::new(r, g, b, alpha as f32)
}

fn round_alpha(a: f32) -> f32 {
    if !a.is_finite() {
        return 0.0;
    }
    (a.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

fn format_alpha(a: f32) -> String {
    let formatted = format!("{a:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_and_named_colors() {
        assert_eq!(normalize("#ff0000"), "rgba(255,0,0,1)");
        assert_eq!(normalize("#0f0"), "rgba(0,255,0,1)");
        assert_eq!(normalize("White"), "rgba(255,255,255,1)");
        assert_eq!(normalize("  navy "), "rgba(0,0,128,1)");
    }

    #[test]
    fn test_rgba_with_alpha() {
        assert_eq!(normalize("rgba(10, 20, 30, 0.5)"), "rgba(10,20,30,0.5)");
        assert_eq!(normalize("transparent"), TRANSPARENT_BLACK);
    }

    #[test]
    fn test_invalid_input_is_transparent_black() {
        assert_eq!(normalize(""), TRANSPARENT_BLACK);
        assert_eq!(normalize("not-a-color"), TRANSPARENT_BLACK);
        assert_eq!(normalize("oklch(0.2 0.05)"), TRANSPARENT_BLACK);
        assert_eq!(normalize("color(rec2020 1 0 0)"), TRANSPARENT_BLACK);
    }

    #[test]
    fn test_oklch_normalizes_into_srgb() {
        let canonical = normalize("oklch(0.2 0.05 250)");
        assert!(canonical.starts_with("rgba("), "got {canonical}");
        let color = parse(&canonical).unwrap();
        assert_eq!(color.a, 1.0);
        // A dark blue: blue dominates, nothing saturates
        assert!(color.b > color.r, "{canonical}");
        assert!(color.b < 80, "{canonical}");
    }

    #[test]
    fn test_oklab_white_and_black() {
        assert_eq!(normalize("oklab(1 0 0)"), "rgba(255,255,255,1)");
        assert_eq!(normalize("oklab(0 0 0)"), "rgba(0,0,0,1)");
        assert_eq!(normalize("oklch(100% 0 0 / 50%)"), "rgba(255,255,255,0.5)");
    }

    #[test]
    fn test_cielab_white_and_mid_gray() {
        assert_eq!(normalize("lab(100 0 0)"), "rgba(255,255,255,1)");
        let gray = parse("lch(50% 0 0)").unwrap();
        assert_eq!(gray.r, gray.g);
        assert_eq!(gray.g, gray.b);
        assert!((115..=121).contains(&gray.r), "{gray:?}");
    }

    #[test]
    fn test_color_function_spaces() {
        assert_eq!(normalize("color(srgb 1 0 0)"), "rgba(255,0,0,1)");
        assert_eq!(normalize("color(srgb-linear 0 0 0 / 0.25)"), "rgba(0,0,0,0.25)");
        // P3 red sits outside sRGB and clamps
        assert_eq!(normalize("color(display-p3 1 0 0)"), "rgba(255,0,0,1)");
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(Rgba::new(23, 23, 23, 1.0).to_hex(), "#171717");
    }

    proptest! {
        #[test]
        fn prop_canonical_is_fixed_point(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), pct in 0u32..=100) {
            let canonical = Rgba::new(r, g, b, pct as f32 / 100.0).to_canonical();
            prop_assert_eq!(normalize(&canonical), canonical);
        }

        #[test]
        fn prop_normalize_is_idempotent(input in "\\PC{0,24}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
