//! Where encoded images end up

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use snipprok_core::error::{ExportError, Result};

/// Suffix of the scratch file a save writes before renaming
pub const PART_SUFFIX: &str = ".part";

/// Destination for finished exports
pub trait Sink: Send + Sync {
    /// Store `bytes` under `filename`; returns where they went
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        (**self).save(filename, bytes)
    }
}

/// Saves into a directory, never leaving a half-written file behind
///
/// Bytes go to `<name>.part` first and are renamed into place. An existing
/// file is not overwritten; the name gets a `-1`, `-2`, ... suffix instead.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn free_path(&self, filename: &str) -> PathBuf {
        let candidate = self.dir.join(filename);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, extension) = match filename.rsplit_once('.') {
            Some((stem, extension)) => (stem, format!(".{extension}")),
            None => (filename, String::new()),
        };
        (1..)
            .map(|n| self.dir.join(format!("{stem}-{n}{extension}")))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

impl Sink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.free_path(filename);
        let part = PartFile::new(part_path(&target));

        let write = |path: &Path| -> std::io::Result<()> {
            let mut file = File::create(path)?;
            file.write_all(bytes)?;
            file.sync_all()
        };
        write(part.path()).map_err(|e| write_failed(part.path(), &e))?;
        fs::rename(part.path(), &target).map_err(|e| write_failed(&target, &e))?;
        part.disarm();

        log::debug!("saved {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }
}

/// Keeps saves in memory; used by previews and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        match self.saved.lock() {
            Ok(saved) => saved.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Sink for MemorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| ExportError::WriteFailed("memory sink poisoned".into()))?;
        saved.push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(filename))
    }
}

fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

fn write_failed(path: &Path, e: &std::io::Error) -> ExportError {
    ExportError::WriteFailed(format!("{}: {e}", path.display()))
}

/// Scratch file removed on drop unless disarmed
struct PartFile {
    path: PathBuf,
    armed: bool,
}

impl PartFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                log::warn!("could not remove {}: {e}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> tempfile::TempDir {
        match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => unreachable!("tempdir: {e}"),
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .map(|read| {
                read.filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn test_save_writes_bytes_and_no_part_file() {
        let dir = scratch();
        let sink = DirectorySink::new(dir.path());
        let path = match sink.save("snipprok-2024-03-05.png", b"png bytes") {
            Ok(path) => path,
            Err(e) => unreachable!("save failed: {e}"),
        };
        assert_eq!(path, dir.path().join("snipprok-2024-03-05.png"));
        assert_eq!(fs::read(&path).ok(), Some(b"png bytes".to_vec()));
        assert_eq!(entries(dir.path()), vec!["snipprok-2024-03-05.png"]);
    }

    #[test]
    fn test_existing_files_are_kept() {
        let dir = scratch();
        let sink = DirectorySink::new(dir.path());
        let first = sink.save("card.png", b"one").ok();
        let second = sink.save("card.png", b"two").ok();
        assert_eq!(first, Some(dir.path().join("card.png")));
        assert_eq!(second, Some(dir.path().join("card-1.png")));
        assert_eq!(fs::read(dir.path().join("card.png")).ok(), Some(b"one".to_vec()));
    }

    #[test]
    fn test_missing_directory_is_write_failure() {
        let sink = DirectorySink::new("/nonexistent/snipprok/out");
        assert!(matches!(
            sink.save("card.png", b"x"),
            Err(snipprok_core::SnipError::ExportFailed(ExportError::WriteFailed(_)))
        ));
    }

    #[test]
    fn test_part_file_is_removed_when_dropped_armed() {
        let dir = scratch();
        let path = dir.path().join("card.png.part");
        let _ = fs::write(&path, b"half");
        drop(PartFile::new(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_sink_records_saves() {
        let sink = MemorySink::new();
        assert!(sink.save("a.png", b"1").is_ok());
        assert_eq!(sink.saved(), vec![("a.png".to_string(), b"1".to_vec())]);
    }
}
