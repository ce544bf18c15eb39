//! Places a font can come from

use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use snipprok_core::error::{FontError, Result};

use crate::MAX_FONT_SIZE;

/// One entry of a [`crate::FontChain`]
pub trait FontSource: Send + Sync {
    /// Shown in logs and in the source list
    fn describe(&self) -> String;

    /// Raw bytes; validation happens in the chain
    fn load(&self) -> Result<Vec<u8>>;
}

/// A font file on disk
#[derive(Debug, Clone)]
pub struct LocalFontSource {
    path: PathBuf,
}

impl LocalFontSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FontSource for LocalFontSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<u8>> {
        let metadata = fs::metadata(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FontError::FileNotFound(self.path.display().to_string()).into(),
            _ => snipprok_core::SnipError::Io(e),
        })?;
        if metadata.len() > MAX_FONT_SIZE {
            return Err(FontError::InvalidData(format!(
                "{} is {} bytes, over the {MAX_FONT_SIZE} byte limit",
                self.path.display(),
                metadata.len()
            ))
            .into());
        }

        Ok(fs::read(&self.path)?)
    }
}

/// A font fetched over HTTPS
#[derive(Debug, Clone)]
pub struct RemoteFontSource {
    url: String,
}

impl RemoteFontSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn fetch_failed(&self, reason: impl ToString) -> FontError {
        FontError::FetchFailed {
            source_name: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl FontSource for RemoteFontSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> Result<Vec<u8>> {
        log::debug!("fetching font from {}", self.url);
        let agent: ureq::Agent = ureq::Agent::config_builder().build().into();

        let mut response = agent
            .get(&self.url)
            .call()
            .map_err(|e| self.fetch_failed(e))?;

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_FONT_SIZE)
            .read_to_vec()
            .map_err(|e| self.fetch_failed(e))?;

        Ok(bytes)
    }
}

static SYSTEM_FONTS: Lazy<fontdb::Database> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("indexed {} system font faces", db.len());
    db
});

/// An installed font, looked up by family (monospace when unnamed)
#[derive(Debug, Clone, Default)]
pub struct SystemFontSource {
    family: Option<String>,
}

impl SystemFontSource {
    /// The system's default monospace face
    pub fn monospace() -> Self {
        Self { family: None }
    }

    pub fn family(name: impl Into<String>) -> Self {
        Self {
            family: Some(name.into()),
        }
    }
}

impl FontSource for SystemFontSource {
    fn describe(&self) -> String {
        match &self.family {
            Some(family) => format!("system:{family}"),
            None => "system:monospace".to_string(),
        }
    }

    fn load(&self) -> Result<Vec<u8>> {
        let family = match &self.family {
            Some(name) => fontdb::Family::Name(name),
            None => fontdb::Family::Monospace,
        };
        let query = fontdb::Query {
            families: &[family],
            ..fontdb::Query::default()
        };

        let id = SYSTEM_FONTS
            .query(&query)
            .ok_or_else(|| FontError::SystemFontNotFound(self.describe()))?;

        SYSTEM_FONTS
            .with_face_data(id, |data, _index| data.to_vec())
            .ok_or_else(|| FontError::SystemFontNotFound(self.describe()).into())
    }
}

/// Bytes already in memory, e.g. a font compiled into the binary
#[derive(Debug, Clone)]
pub struct MemoryFontSource {
    label: String,
    bytes: Cow<'static, [u8]>,
}

impl MemoryFontSource {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes: Cow::Owned(bytes),
        }
    }

    /// Borrow bytes from `include_bytes!`
    pub fn from_static(label: impl Into<String>, bytes: &'static [u8]) -> Self {
        Self {
            label: label.into(),
            bytes: Cow::Borrowed(bytes),
        }
    }
}

impl FontSource for MemoryFontSource {
    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn load(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipprok_core::SnipError;

    #[test]
    fn test_missing_file_is_file_not_found() {
        let source = LocalFontSource::new("/nonexistent/snipprok/mono.ttf");
        assert!(matches!(
            source.load(),
            Err(SnipError::Font(FontError::FileNotFound(_)))
        ));
        assert_eq!(source.describe(), "file:/nonexistent/snipprok/mono.ttf");
    }

    #[test]
    fn test_bad_url_is_fetch_failure() {
        let source = RemoteFontSource::new("not a url");
        assert!(matches!(
            source.load(),
            Err(SnipError::Font(FontError::FetchFailed { .. }))
        ));
    }

    #[test]
    fn test_unknown_system_family_is_not_found() {
        let source = SystemFontSource::family("Snipprok No Such Family 9f3c");
        assert!(matches!(
            source.load(),
            Err(SnipError::Font(FontError::SystemFontNotFound(_)))
        ));
    }

    #[test]
    fn test_memory_source_returns_its_bytes() {
        let source = MemoryFontSource::new("x", vec![1, 2, 3]);
        assert_eq!(source.load().ok(), Some(vec![1, 2, 3]));
    }
}
