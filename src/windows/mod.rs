//! Live shared-memory access on Windows.
//!
//! The simulator publishes its telemetry through a named file mapping plus a
//! data-valid event. [`MappedRegion`] maps the region read-only and implements
//! [`SharedRegion`](crate::memory::SharedRegion); the consistent-read protocol
//! lives in [`BufferReader`](crate::memory::BufferReader).
//!
//! ```rust,ignore
//! use paddock::windows::MappedRegion;
//!
//! let region = MappedRegion::open()?;
//! ```

mod mapping;

pub use mapping::{DATA_VALID_EVENT_NAME, MEMMAP_NAME, MappedRegion};
