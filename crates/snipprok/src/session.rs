//! One export at a time, saved to a sink
//!
//! [`ExportSession::export`] is what a save button calls. It never returns
//! an error: failures are logged and turned into a [`Notification`] with a
//! generic message, and nothing is saved.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use snipprok_core::{
    error::{ExportError, Result, SnipError},
    ExportParameters,
};
use snipprok_export::{filename_for, filename_today, Sink};

use crate::Snipprok;

/// Shown to the user for any failed export
pub const GENERIC_FAILURE: &str = "Export failed. Please try again.";

/// What a finished export produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub line_count: usize,
    pub bytes: usize,
}

/// Outcome of a user-triggered export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Saved(ExportReport),
    /// Another export was still running; this trigger was dropped
    Busy,
    Failed { message: String },
}

/// Serializes exports and saves their output
pub struct ExportSession {
    snipprok: Snipprok,
    sink: Box<dyn Sink>,
    busy: AtomicBool,
    date: Option<NaiveDate>,
}

impl ExportSession {
    pub fn new(snipprok: Snipprok, sink: impl Sink + 'static) -> Self {
        Self {
            snipprok,
            sink: Box::new(sink),
            busy: AtomicBool::new(false),
            date: None,
        }
    }

    /// Stamp filenames with a fixed date instead of today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn snipprok(&self) -> &Snipprok {
        &self.snipprok
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Export and save, reporting the outcome instead of failing
    pub fn export(&self, params: &ExportParameters) -> Notification {
        match self.try_export(params) {
            Ok(report) => {
                log::info!(
                    "saved {}x{} card to {}",
                    report.width,
                    report.height,
                    report.path.display()
                );
                Notification::Saved(report)
            },
            Err(SnipError::ExportFailed(ExportError::Busy)) => {
                log::warn!("export already in progress, ignoring trigger");
                Notification::Busy
            },
            Err(e) => {
                log::error!("export failed: {e}");
                Notification::Failed {
                    message: GENERIC_FAILURE.to_string(),
                }
            },
        }
    }

    /// Export and save; [`ExportError::Busy`] while another export runs
    pub fn try_export(&self, params: &ExportParameters) -> Result<ExportReport> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let image = self.snipprok.render(params)?;
        let filename = match self.date {
            Some(date) => filename_for(date, params.pixel_scale, image.extension),
            None => filename_today(params.pixel_scale, image.extension),
        };
        let path = self.sink.save(&filename, &image.bytes)?;

        Ok(ExportReport {
            path,
            width: image.width,
            height: image.height,
            line_count: image.line_count,
            bytes: image.bytes.len(),
        })
    }
}

/// Holds the busy flag for the life of one export
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipprok_export::MemorySink;
    use snipprok_fontdb::FontChain;
    use std::sync::Arc;

    #[test]
    fn test_busy_guard_rejects_second_holder() {
        let flag = AtomicBool::new(false);
        let first = BusyGuard::acquire(&flag);
        assert!(first.is_ok());
        assert!(matches!(
            BusyGuard::acquire(&flag),
            Err(SnipError::ExportFailed(ExportError::Busy))
        ));
        drop(first);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn test_failure_is_generic_and_saves_nothing() {
        let snipprok = match Snipprok::builder().fonts(Arc::new(FontChain::new())).build() {
            Ok(snipprok) => snipprok,
            Err(e) => unreachable!("setup failed: {e}"),
        };
        let sink = Arc::new(MemorySink::new());
        let session = ExportSession::new(snipprok, sink.clone());
        let params = ExportParameters {
            source_text: "let x = 1;".into(),
            language_tag: "javascript".into(),
            ..ExportParameters::default()
        };

        assert_eq!(session.export(&params), Notification::Failed {
            message: GENERIC_FAILURE.to_string()
        });
        assert!(sink.saved().is_empty());
        assert!(!session.is_busy());
    }
}
