//! Shared-memory access: regions, the consistent-read protocol and an
//! in-process writer.
//!
//! ```rust
//! use std::sync::Arc;
//! use paddock::memory::{BufferReader, SimulatedWriter};
//! use paddock::observe::NullSink;
//! use paddock::{ReaderConfig, VariableInfo, VariableType};
//!
//! let (region, mut writer) = SimulatedWriter::builder()
//!     .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
//!     .buf_len(4)
//!     .build()?;
//! writer.publish(&42.5f32.to_le_bytes())?;
//!
//! let mut reader = BufferReader::new(region, ReaderConfig::default(), Arc::new(NullSink));
//! let schema = reader.decode_schema()?;
//! let mut scratch = vec![0u8; schema.buf_len()];
//! assert!(reader.read_into(&mut scratch)?);
//! assert_eq!(schema.extract::<f32>(&scratch, "Speed")?, 42.5);
//! # Ok::<(), paddock::TelemetryError>(())
//! ```

mod reader;
mod region;
mod writer;

pub use reader::BufferReader;
pub use region::{InMemoryRegion, RegionWriter, SharedRegion};
pub use writer::{SimulatedWriter, WriterBuilder};
