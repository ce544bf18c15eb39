//! Error types for Snipprok

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnipError>;

/// Main error type for Snipprok
#[derive(Debug, Error)]
pub enum SnipError {
    #[error("Font unavailable: {0}")]
    Font(#[from] FontError),

    #[error("Rendering failed: {0}")]
    RenderingFailed(#[from] RenderError),

    #[error("Export failed: {0}")]
    ExportFailed(#[from] ExportError),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Font acquisition errors
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Font fetch failed for {source_name}: {reason}")]
    FetchFailed { source_name: String, reason: String },

    #[error("Invalid font data from {0}")]
    InvalidData(String),

    #[error("Compressed web fonts are not supported ({0})")]
    UnsupportedWebFont(String),

    #[error("System font not found: {0}")]
    SystemFontNotFound(String),

    #[error("font unavailable: all {attempted} font sources failed")]
    Exhausted { attempted: usize },
}

/// Vector and raster rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("SVG document rejected: {0}")]
    SvgParse(String),

    #[error("Could not allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },

    #[error("Rasterizer unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Document building failed: {0}")]
    DocumentBuild(String),
}

/// Encoding and save errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Another export is already in progress")]
    Busy,
}

impl From<serde_json::Error> for SnipError {
    fn from(err: serde_json::Error) -> Self {
        SnipError::Config(err.to_string())
    }
}

impl From<std::fmt::Error> for RenderError {
    fn from(_: std::fmt::Error) -> Self {
        RenderError::DocumentBuild("formatter error".into())
    }
}
