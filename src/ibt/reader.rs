//! Random-access reader for recorded captures.
//!
//! ```rust,no_run
//! use paddock::ibt::IbtReader;
//!
//! fn dump() -> paddock::Result<()> {
//!     let mut reader = IbtReader::open("okayama.ibt")?;
//!     let mut scratch = vec![0u8; reader.schema().buf_len()];
//!     while let Some(frame) = reader.read_frame_into(&mut scratch)? {
//!         let speed: f32 = reader.schema().extract(&scratch, "Speed")?;
//!         println!("{} @ {}: {speed}", frame.index, frame.tick);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The whole file is loaded at open; seeking only moves the cursor.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::format::{DiskHeader, frame_data_start};
use crate::schema::decode_partial;
use crate::schema::header::TelemetryHeader;
use crate::{Result, TelemetryError, VariableSchema, VariableType};

/// Variable carrying the writer's tick in each record.
const TICK_VARIABLE: &str = "SessionTick";
const DEFAULT_TICK_RATE: f64 = 60.0;

/// Position and tick of a record read by [`IbtReader::read_frame_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedFrame {
    pub index: usize,
    /// The record's `SessionTick` if the capture has one, else its index.
    pub tick: i32,
}

pub struct IbtReader {
    data: Vec<u8>,
    path: PathBuf,
    header: TelemetryHeader,
    disk_header: DiskHeader,
    schema: VariableSchema,
    rejected: Vec<TelemetryError>,
    frame_data_start: usize,
    total_frames: usize,
    current_frame: usize,
}

impl IbtReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|err| TelemetryError::file_error(path.to_path_buf(), err))?;
        Self::from_bytes_with_path(data, path.to_path_buf())
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_bytes_with_path(data.into(), PathBuf::from("<memory>"))
    }

    fn from_bytes_with_path(data: Vec<u8>, path: PathBuf) -> Result<Self> {
        let header = TelemetryHeader::parse(&data).map_err(|_| {
            TelemetryError::format_error("header", format!("capture is only {} bytes", data.len()))
        })?;
        header.validate()?;
        let disk_header = DiskHeader::parse(&data)?;

        let buf_len = header.buf_len as usize;
        let table = data.get(header.var_headers_range()).unwrap_or_default();
        let (schema, rejected) = decode_partial(table, header.num_vars as usize, buf_len)?;
        for err in &rejected {
            warn!(path = %path.display(), error = %err, "skipping damaged variable header");
        }

        let frame_data_start = frame_data_start(&header);
        let remaining = data.len().checked_sub(frame_data_start).ok_or_else(|| {
            TelemetryError::format_error(
                "records",
                format!("records start at {frame_data_start}, past the end of {} bytes", data.len()),
            )
        })?;
        let total_frames = match (buf_len, disk_header.record_count) {
            (0, _) => 0,
            (_, count) if count > 0 => (count as usize).min(remaining.div_ceil(buf_len)),
            _ => remaining / buf_len,
        };
        if disk_header.record_count > 0 && total_frames * buf_len > remaining {
            warn!(
                path = %path.display(),
                records = disk_header.record_count,
                bytes = remaining,
                "capture ends inside its last record"
            );
        }

        debug!(
            path = %path.display(),
            frames = total_frames,
            variables = schema.len(),
            buf_len,
            "opened capture"
        );
        Ok(Self {
            data,
            path,
            header,
            disk_header,
            schema,
            rejected,
            frame_data_start,
            total_frames,
            current_frame: 0,
        })
    }

    pub fn header(&self) -> &TelemetryHeader {
        &self.header
    }

    pub fn disk_header(&self) -> &DiskHeader {
        &self.disk_header
    }

    pub fn schema(&self) -> &VariableSchema {
        &self.schema
    }

    /// Variable headers that could not be decoded and were left out of the schema.
    pub fn rejected_variables(&self) -> &[TelemetryError] {
        &self.rejected
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recorded session text, unparsed. `None` if the capture has none.
    pub fn session_text(&self) -> Result<Option<String>> {
        let range = self.header.session_range();
        if range.is_empty() {
            return Ok(None);
        }
        let bytes = self.data.get(range.clone()).ok_or_else(|| {
            TelemetryError::format_error(
                "session text",
                format!("{}..{} outside capture of {} bytes", range.start, range.end, self.data.len()),
            )
        })?;
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let text = String::from_utf8_lossy(&bytes[..len]);
        Ok((!text.trim().is_empty()).then(|| text.into_owned()))
    }

    /// Recording rate in Hz, or 60 if the header holds none.
    pub fn tick_rate(&self) -> f64 {
        if self.header.tick_rate > 0 { f64::from(self.header.tick_rate) } else { DEFAULT_TICK_RATE }
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Index of the next record [`read_frame_into`](Self::read_frame_into) returns.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn seek_to_frame(&mut self, frame: usize) -> Result<()> {
        if frame >= self.total_frames {
            return Err(TelemetryError::format_error(
                "seek",
                format!("frame {frame} out of range 0..{}", self.total_frames),
            ));
        }
        self.current_frame = frame;
        Ok(())
    }

    /// Copy the next record into `scratch` and advance.
    ///
    /// Returns `Ok(None)` past the last record. A record that cannot be read
    /// fails on its own: the cursor still moves past it.
    pub fn read_frame_into(&mut self, scratch: &mut [u8]) -> Result<Option<RecordedFrame>> {
        let index = self.current_frame;
        if index >= self.total_frames {
            return Ok(None);
        }
        let buf_len = self.schema.buf_len();
        let scratch_len = scratch.len();
        let dst = scratch.get_mut(..buf_len).ok_or_else(|| {
            TelemetryError::buffer_operation_error(
                format!("scratch of {scratch_len} bytes for {buf_len}-byte records"),
                None,
            )
        })?;

        self.current_frame += 1;
        let start = self.frame_data_start + index * buf_len;
        let record = self.data.get(start..start + buf_len).ok_or_else(|| {
            TelemetryError::format_error(
                format!("record {index}"),
                format!("truncated: capture ends at {}", self.data.len()),
            )
        })?;
        dst.copy_from_slice(record);

        let tick = self
            .schema
            .get(TICK_VARIABLE)
            .filter(|info| info.data_type == VariableType::Int32)
            .and_then(|info| crate::types::extract::<i32>(record, info).ok())
            .unwrap_or(index as i32);
        Ok(Some(RecordedFrame { index, tick }))
    }
}

impl std::fmt::Debug for IbtReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbtReader")
            .field("path", &self.path)
            .field("total_frames", &self.total_frames)
            .field("current_frame", &self.current_frame)
            .field("variables", &self.schema.len())
            .finish()
    }
}
