//! Recorded captures (cross-platform).
//!
//! A capture holds one session-text snapshot and a run of raw records laid out
//! like live samples, so the provider can replay it through the same path as
//! the shared-memory reader.

pub mod format;
pub mod reader;

pub use format::{CaptureBuilder, DiskHeader};
pub use reader::{IbtReader, RecordedFrame};
