//! Telemetry ingestion for racing simulators that publish through shared memory.
//!
//! The simulator's writer process keeps a shared-memory region up to date at
//! tens of Hz: a fixed header, a self-describing table of variable headers, a
//! YAML session description, and a ring of sample slots. Paddock reads that
//! region without ever blocking the writer, decodes the schema and session
//! text, and serves both through one provider that can also replay recorded
//! captures.
//!
//! # Features
//!
//! - **Consistent reads**: torn samples are detected and retried
//! - **Schema decoding**: variable headers become a typed [`VariableSchema`]
//! - **Session parsing**: the writer's YAML dialect becomes a [`SessionDescription`]
//! - **Replay**: recorded captures go through the same provider on any platform
//! - **Async**: a tokio [`Driver`](driver::Driver) publishes samples on watch channels
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use paddock::observe::TracingSink;
//! use paddock::{ProviderConfig, SessionDataProvider};
//!
//! fn main() -> paddock::Result<()> {
//!     let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(TracingSink));
//!     provider.bind_recorded("okayama.ibt")?;
//!     while let Some(sample) = provider.advance()? {
//!         let speed: f32 = sample.value("Speed")?;
//!         println!("{}: {speed:.1} m/s", sample.tick);
//!     }
//!     if let Some(session) = provider.session() {
//!         println!("track: {}", session.weekend_info.track_name);
//!     }
//!     Ok(())
//! }
//! ```

mod error;

pub mod config;
pub mod guard;
pub mod lut;
pub mod observe;
pub mod sync;
pub mod types;

// Shared memory and schema
pub mod memory;
pub mod schema;
#[cfg(windows)]
pub mod windows;

// Session text, captures and the consumer-facing provider
pub mod driver;
pub mod ibt;
pub mod provider;
pub mod session;

#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

pub use config::{ProviderConfig, ReaderConfig};
pub use error::*;
pub use types::*;

pub use driver::{Driver, DriverChannels};
pub use ibt::IbtReader;
pub use memory::{BufferReader, SharedRegion};
pub use observe::{TelemetryEvent, TelemetrySink};
pub use provider::{Sample, SessionDataProvider, SourceKind};
pub use session::SessionDescription;
