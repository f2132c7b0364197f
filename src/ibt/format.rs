//! Recorded capture layout.
//!
//! A capture is the writer's shared-memory image flattened to disk:
//!
//! 1. **Telemetry header** (112 bytes), the same layout as the live region;
//!    slot 0's `buf_offset` points at the first record
//! 2. **Disk sub-header** (32 bytes) with session timing and the record count
//! 3. **Variable headers**, `num_vars` × 144 bytes
//! 4. **Session text**, one snapshot of the session description
//! 5. **Records**, `record_count` × `buf_len` bytes back to back
//!
//! All integers are little-endian.

use tracing::trace;

use crate::schema::encode_var_header;
use crate::schema::header::{
    HEADER_SIZE, HEADER_VERSION, MAX_SLOTS, STATUS_CONNECTED, SlotDescriptor, TelemetryHeader,
    VAR_HEADER_SIZE, read_f64_le, read_i32_le, read_i64_le,
};
use crate::{Result, TelemetryError, VariableInfo};

pub const DISK_HEADER_OFFSET: usize = HEADER_SIZE;
pub const DISK_HEADER_SIZE: usize = 32;
/// Where a capture written by [`CaptureBuilder`] puts its variable headers.
pub const VAR_HEADERS_OFFSET: usize = DISK_HEADER_OFFSET + DISK_HEADER_SIZE;

/// Disk sub-header. Times are session seconds; `start_date` is a Unix timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiskHeader {
    pub start_date: i64,
    pub start_time: f64,
    pub end_time: f64,
    pub lap_count: i32,
    pub record_count: i32,
}

impl DiskHeader {
    pub fn parse(capture: &[u8]) -> Result<Self> {
        let bytes = capture
            .get(DISK_HEADER_OFFSET..DISK_HEADER_OFFSET + DISK_HEADER_SIZE)
            .ok_or_else(|| {
                TelemetryError::format_error(
                    "disk header",
                    format!("capture of {} bytes ends before the disk header", capture.len()),
                )
            })?;
        Ok(Self {
            start_date: read_i64_le(bytes, 0).unwrap_or_default(),
            start_time: read_f64_le(bytes, 8).unwrap_or_default(),
            end_time: read_f64_le(bytes, 16).unwrap_or_default(),
            lap_count: read_i32_le(bytes, 24).unwrap_or_default(),
            record_count: read_i32_le(bytes, 28).unwrap_or_default(),
        })
    }

    pub fn to_bytes(&self) -> [u8; DISK_HEADER_SIZE] {
        let mut bytes = [0u8; DISK_HEADER_SIZE];
        bytes[0..8].copy_from_slice(&self.start_date.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.start_time.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.end_time.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.lap_count.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.record_count.to_le_bytes());
        bytes
    }

    /// Recorded session time in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}

/// Offset of the first record.
///
/// Slot 0 names it when set; otherwise records follow whichever of the
/// variable table and the session text ends last.
pub(crate) fn frame_data_start(header: &TelemetryHeader) -> usize {
    match header.slots[0].buf_offset {
        offset if header.num_buf > 0 && offset > 0 => offset as usize,
        _ => header.var_headers_range().end.max(header.session_range().end),
    }
}

/// Assembles a capture in memory.
///
/// ```rust
/// use paddock::ibt::{CaptureBuilder, IbtReader};
/// use paddock::{VariableInfo, VariableType};
///
/// let capture = CaptureBuilder::new()
///     .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
///     .buf_len(4)
///     .record(&12.5f32.to_le_bytes())
///     .build()
///     .unwrap();
/// let reader = IbtReader::from_bytes(capture).unwrap();
/// assert_eq!(reader.total_frames(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CaptureBuilder {
    variables: Vec<VariableInfo>,
    buf_len: usize,
    session_text: String,
    tick_rate: i32,
    start_date: i64,
    lap_count: i32,
    records: Vec<Vec<u8>>,
}

impl Default for CaptureBuilder {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            buf_len: 0,
            session_text: String::new(),
            tick_rate: 60,
            start_date: 0,
            lap_count: 0,
            records: Vec::new(),
        }
    }
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, info: VariableInfo) -> Self {
        self.variables.push(info);
        self
    }

    pub fn variables(mut self, infos: impl IntoIterator<Item = VariableInfo>) -> Self {
        self.variables.extend(infos);
        self
    }

    pub fn buf_len(mut self, buf_len: usize) -> Self {
        self.buf_len = buf_len;
        self
    }

    pub fn session_text(mut self, text: impl Into<String>) -> Self {
        self.session_text = text.into();
        self
    }

    pub fn tick_rate(mut self, tick_rate: i32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn start_date(mut self, unix_secs: i64) -> Self {
        self.start_date = unix_secs;
        self
    }

    pub fn lap_count(mut self, laps: i32) -> Self {
        self.lap_count = laps;
        self
    }

    pub fn record(mut self, sample: &[u8]) -> Self {
        self.records.push(sample.to_vec());
        self
    }

    pub fn records<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.records.extend(samples.into_iter().map(|sample| sample.as_ref().to_vec()));
        self
    }

    pub fn build(self) -> Result<Vec<u8>> {
        if let Some(index) = self.records.iter().position(|record| record.len() != self.buf_len) {
            return Err(TelemetryError::buffer_operation_error(
                format!(
                    "record {index} is {} bytes, expected {}",
                    self.records[index].len(),
                    self.buf_len
                ),
                Some(index),
            ));
        }

        let session_offset = VAR_HEADERS_OFFSET + self.variables.len() * VAR_HEADER_SIZE;
        let session_len = if self.session_text.is_empty() { 0 } else { self.session_text.len() + 1 };
        let data_start = session_offset + session_len;
        let record_count = self.records.len();

        let mut slots = [SlotDescriptor::default(); MAX_SLOTS];
        slots[0] = SlotDescriptor { tick_count: record_count as i32, buf_offset: data_start as i32 };
        let header = TelemetryHeader {
            ver: HEADER_VERSION,
            status: STATUS_CONNECTED,
            tick_rate: self.tick_rate,
            session_info_update: 1,
            session_info_len: session_len as i32,
            session_info_offset: session_offset as i32,
            num_vars: self.variables.len() as i32,
            var_header_offset: VAR_HEADERS_OFFSET as i32,
            num_buf: 1,
            buf_len: self.buf_len as i32,
            slots,
        };
        let rate = f64::from(self.tick_rate.max(1));
        let disk = DiskHeader {
            start_date: self.start_date,
            start_time: 0.0,
            end_time: record_count as f64 / rate,
            lap_count: self.lap_count,
            record_count: record_count as i32,
        };

        let mut bytes = Vec::with_capacity(data_start + record_count * self.buf_len);
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&disk.to_bytes());
        bytes.extend(self.variables.iter().flat_map(encode_var_header));
        if session_len > 0 {
            bytes.extend_from_slice(self.session_text.as_bytes());
            bytes.push(0);
        }
        for record in &self.records {
            bytes.extend_from_slice(record);
        }
        trace!(bytes = bytes.len(), records = record_count, "built capture");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VariableType;

    #[test]
    fn disk_header_sits_after_telemetry_header() {
        let capture = CaptureBuilder::new()
            .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
            .buf_len(4)
            .tick_rate(60)
            .lap_count(3)
            .start_date(1_700_000_000)
            .records([[0u8; 4]; 120])
            .build()
            .unwrap();

        let disk = DiskHeader::parse(&capture).unwrap();
        assert_eq!(disk.record_count, 120);
        assert_eq!(disk.lap_count, 3);
        assert_eq!(disk.start_date, 1_700_000_000);
        assert_eq!(disk.duration_secs(), 2.0);

        let header = TelemetryHeader::parse(&capture).unwrap();
        assert_eq!(header.var_header_offset as usize, VAR_HEADERS_OFFSET);
        assert_eq!(frame_data_start(&header), VAR_HEADERS_OFFSET + 144);
    }

    #[test]
    fn records_of_the_wrong_size_are_refused() {
        let result = CaptureBuilder::new().buf_len(4).record(&[0; 4]).record(&[0; 3]).build();
        assert!(matches!(result, Err(TelemetryError::Buffer { buffer_index: Some(1), .. })));
    }

    #[test]
    fn data_start_falls_back_to_end_of_tables() {
        let header = TelemetryHeader {
            num_vars: 2,
            var_header_offset: 144,
            session_info_offset: 432,
            session_info_len: 100,
            ..TelemetryHeader::default()
        };
        assert_eq!(frame_data_start(&header), 532);

        let no_session = TelemetryHeader { session_info_len: 0, session_info_offset: 0, ..header };
        assert_eq!(frame_data_start(&no_session), 432);
    }

    #[test]
    fn short_capture_has_no_disk_header() {
        assert!(matches!(DiskHeader::parse(&[0u8; 120]), Err(TelemetryError::Format { .. })));
    }
}
