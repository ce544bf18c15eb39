//! Checks against a real TrueType font
//!
//! Set `SNIPPROK_TEST_FONT` to a `.ttf` path, or rely on a common system
//! location. Each test returns early when no font is around.

use std::path::PathBuf;

use snipprok_core::traits::FontProvider;
use snipprok_fontdb::{FontChain, FontInfo, LocalFontSource, MemoryFontSource};

const SYSTEM_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

fn test_font_path() -> Option<PathBuf> {
    std::env::var_os("SNIPPROK_TEST_FONT")
        .map(PathBuf::from)
        .into_iter()
        .chain(SYSTEM_CANDIDATES.iter().map(PathBuf::from))
        .find(|path| path.is_file())
}

#[test]
fn local_font_wins_over_later_sources() {
    let Some(path) = test_font_path() else {
        eprintln!("no test font found, skipping");
        return;
    };

    let chain = FontChain::new()
        .with_source(MemoryFontSource::new("broken", vec![0; 32]))
        .with_source(LocalFontSource::new(&path));

    let font = match chain.acquire() {
        Ok(font) => font,
        Err(e) => unreachable!("real font should load: {e}"),
    };
    assert!(font.origin.starts_with("file:"));

    let info = match FontInfo::read(&font) {
        Ok(info) => info,
        Err(e) => unreachable!("real font should parse: {e}"),
    };
    assert!(info.units_per_em >= 16);
    assert!(info.ascender > 0);
    assert!(info.descender <= 0);
    assert!(info.family.as_deref().is_some_and(|family| !family.is_empty()));
    assert!(info.ascent_ratio() > 0.0 && info.ascent_ratio() < 2.0);
}

#[test]
fn acquired_font_is_reused() {
    let Some(path) = test_font_path() else {
        eprintln!("no test font found, skipping");
        return;
    };

    let chain = FontChain::new().with_source(LocalFontSource::new(&path));
    let (Ok(first), Ok(second)) = (chain.acquire(), chain.acquire()) else {
        unreachable!("real font should load twice");
    };
    assert!(std::sync::Arc::ptr_eq(&first.bytes, &second.bytes));
}
