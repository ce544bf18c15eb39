//! Export for Snipprok
//!
//! PNG encoding, download names and the sinks finished images are saved to.

pub mod filename;
pub mod png;
pub mod sink;

pub use filename::{filename_for, filename_today};
pub use png::{encode_bitmap_to_png, PngExporter};
pub use sink::{DirectorySink, MemorySink, Sink};
