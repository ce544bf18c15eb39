//! Where the card's font comes from
//!
//! An export embeds exactly one TrueType-compatible font. [`FontChain`]
//! walks an ordered list of [`FontSource`]s (the font compiled into the
//! crate first, then remote mirrors, optionally the system monospace face) and hands out the first
//! one that yields valid bytes. Compressed web fonts are refused because the
//! rasterizer cannot read them.

use once_cell::sync::OnceCell;
use read_fonts::{types::NameId, FontRef as ReadFontRef, TableProvider};

use snipprok_core::{
    error::{FontError, Result},
    traits::FontProvider,
    types::FontData,
};

mod sources;

pub use sources::{
    FontSource, LocalFontSource, MemoryFontSource, RemoteFontSource, SystemFontSource,
};

/// Largest font file any source may return (50MB)
pub const MAX_FONT_SIZE: u64 = 50 * 1024 * 1024;

/// Label of the font compiled into the crate
pub const BUNDLED_FONT_NAME: &str = "DejaVuSansMono.ttf";

/// DejaVu Sans Mono (Bitstream Vera license, see `assets/fonts/`)
pub static BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSansMono.ttf");

/// Mirrors tried when the bundled font is unusable
pub const REMOTE_FONT_URLS: [&str; 2] = [
    "https://raw.githubusercontent.com/JetBrains/JetBrainsMono/master/fonts/ttf/JetBrainsMono-Regular.ttf",
    "https://cdn.jsdelivr.net/gh/JetBrains/JetBrainsMono@master/fonts/ttf/JetBrainsMono-Regular.ttf",
];

const WOFF_MAGIC: &[u8; 4] = b"wOFF";
const WOFF2_MAGIC: &[u8; 4] = b"wOF2";

/// What the renderer needs to know about a font
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    pub family: Option<String>,
    pub units_per_em: u16,
    /// Font units above the baseline
    pub ascender: i16,
    /// Font units below the baseline, negative
    pub descender: i16,
}

impl FontInfo {
    pub fn read(font: &FontData) -> Result<Self> {
        let font_ref = ReadFontRef::new(font.bytes.as_slice())
            .map_err(|_| FontError::InvalidData(font.origin.clone()))?;

        let units_per_em = font_ref
            .head()
            .map(|head| head.units_per_em())
            .unwrap_or(1000);

        // hhea first: it is what line boxes are built from on screen
        let (ascender, descender) = font_ref
            .hhea()
            .ok()
            .map(|hhea| (hhea.ascender().to_i16(), hhea.descender().to_i16()))
            .filter(|(ascender, descender)| i32::from(*ascender) - i32::from(*descender) > 0)
            .or_else(|| {
                font_ref
                    .os2()
                    .ok()
                    .map(|os2| (os2.s_typo_ascender(), os2.s_typo_descender()))
            })
            .unwrap_or((800, -200));

        Ok(Self {
            family: family_name(&font_ref),
            units_per_em,
            ascender,
            descender,
        })
    }

    /// Ascender as a fraction of the em
    pub fn ascent_ratio(&self) -> f32 {
        f32::from(self.ascender) / f32::from(self.units_per_em.max(1))
    }

    /// Descender magnitude as a fraction of the em
    pub fn descent_ratio(&self) -> f32 {
        f32::from(self.descender).abs() / f32::from(self.units_per_em.max(1))
    }
}

fn family_name(font: &ReadFontRef<'_>) -> Option<String> {
    let name = font.name().ok()?;
    let data = name.string_data();
    [NameId::TYPOGRAPHIC_FAMILY_NAME, NameId::FAMILY_NAME]
        .into_iter()
        .find_map(|wanted| {
            name.name_record()
                .iter()
                .filter(|record| record.name_id() == wanted)
                .filter_map(|record| record.string(data).ok())
                .map(|value| value.chars().collect::<String>())
                .find(|value| !value.trim().is_empty())
        })
}

/// Check that bytes are one font the rasterizer can embed
pub fn validate(bytes: Vec<u8>, origin: impl Into<String>) -> Result<FontData> {
    let origin = origin.into();

    if bytes.starts_with(WOFF_MAGIC) || bytes.starts_with(WOFF2_MAGIC) {
        return Err(FontError::UnsupportedWebFont(origin).into());
    }
    if bytes.is_empty() || ReadFontRef::new(&bytes).is_err() {
        return Err(FontError::InvalidData(origin).into());
    }

    Ok(FontData::new(bytes, origin))
}

/// Ordered font sources; the first valid one wins
///
/// A successful font is kept for the life of the chain. Failures are not,
/// so the next export tries every source again.
pub struct FontChain {
    sources: Vec<Box<dyn FontSource>>,
    loaded: OnceCell<FontData>,
}

impl FontChain {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            loaded: OnceCell::new(),
        }
    }

    /// Bundled font, then the two remote mirrors
    pub fn bundled() -> Self {
        let mut chain =
            Self::new().with_source(MemoryFontSource::from_static(BUNDLED_FONT_NAME, BUNDLED_FONT));
        for url in REMOTE_FONT_URLS {
            chain = chain.with_source(RemoteFontSource::new(url));
        }
        chain
    }

    /// Append a source at the end of the chain
    pub fn with_source(mut self, source: impl FontSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Put a source ahead of every other
    pub fn prepend(mut self, source: impl FontSource + 'static) -> Self {
        self.sources.insert(0, Box::new(source));
        self
    }

    pub fn describe(&self) -> Vec<String> {
        self.sources.iter().map(|source| source.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn walk(&self) -> Result<FontData> {
        for source in &self.sources {
            let origin = source.describe();
            log::trace!("trying font source {origin}");

            match source.load().and_then(|bytes| validate(bytes, origin.clone())) {
                Ok(font) => {
                    log::debug!("font acquired from {origin} ({} bytes)", font.bytes.len());
                    return Ok(font);
                },
                Err(e) => log::warn!("font source {origin} failed: {e}"),
            }
        }

        Err(FontError::Exhausted {
            attempted: self.sources.len(),
        }
        .into())
    }
}

impl Default for FontChain {
    fn default() -> Self {
        Self::bundled()
    }
}

impl FontProvider for FontChain {
    fn name(&self) -> &'static str {
        "font-chain"
    }

    fn acquire(&self) -> Result<FontData> {
        self.loaded.get_or_try_init(|| self.walk()).cloned()
    }
}
