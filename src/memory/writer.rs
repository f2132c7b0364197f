//! Simulated writer producing the shared-region layout in process.
//!
//! Used to drive the reader and provider without a running simulator:
//!
//! ```rust
//! use paddock::memory::{SimulatedWriter, SharedRegion};
//! use paddock::{VariableInfo, VariableType};
//!
//! let (region, mut writer) = SimulatedWriter::builder()
//!     .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
//!     .buf_len(4)
//!     .session_text("WeekendInfo:\n TrackName: okayama\n")
//!     .build()
//!     .unwrap();
//! writer.publish(&42.5f32.to_le_bytes()).unwrap();
//! assert!(region.len() > 0);
//! ```

use crate::schema::encode_var_header;
use crate::schema::header::{
    HEADER_SIZE, HEADER_VERSION, MAX_SLOTS, SLOT_DESCRIPTOR_SIZE, SLOT_TABLE_OFFSET,
    STATUS_CONNECTED, SlotDescriptor, TelemetryHeader, VAR_HEADER_SIZE, slot_tick_offset,
};
use crate::{Result, TelemetryError, VariableInfo};

use super::region::{InMemoryRegion, RegionWriter};

const SLOT_ALIGN: usize = 16;

/// Capacity reserved for each part of the image.
#[derive(Debug, Clone)]
pub struct WriterBuilder {
    variables: Vec<VariableInfo>,
    buf_len: usize,
    buf_capacity: Option<usize>,
    max_vars: usize,
    session_text: String,
    session_capacity: usize,
    num_buf: usize,
    tick_rate: i32,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            buf_len: 0,
            buf_capacity: None,
            max_vars: 64,
            session_text: String::new(),
            session_capacity: 64 * 1024,
            num_buf: MAX_SLOTS,
            tick_rate: 60,
        }
    }
}

impl WriterBuilder {
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

    /// Room per slot for later, larger schemas. Defaults to `buf_len`.
    pub fn buf_capacity(mut self, capacity: usize) -> Self {
        self.buf_capacity = Some(capacity);
        self
    }

    pub fn max_vars(mut self, max_vars: usize) -> Self {
        self.max_vars = max_vars;
        self
    }

    pub fn session_text(mut self, text: impl Into<String>) -> Self {
        self.session_text = text.into();
        self
    }

    pub fn session_capacity(mut self, capacity: usize) -> Self {
        self.session_capacity = capacity;
        self
    }

    pub fn num_buf(mut self, num_buf: usize) -> Self {
        self.num_buf = num_buf.min(MAX_SLOTS);
        self
    }

    pub fn tick_rate(mut self, tick_rate: i32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Lay out the image and return the reader side and the writer.
    pub fn build(self) -> Result<(InMemoryRegion, SimulatedWriter)> {
        let buf_capacity = self.buf_capacity.unwrap_or(self.buf_len).max(self.buf_len);
        let var_header_offset = HEADER_SIZE;
        let session_offset = var_header_offset + self.max_vars * VAR_HEADER_SIZE;
        let data_offset = (session_offset + self.session_capacity).next_multiple_of(SLOT_ALIGN);
        let slot_stride = buf_capacity.next_multiple_of(SLOT_ALIGN);
        let len = data_offset + slot_stride * self.num_buf;

        let (region, bytes) = InMemoryRegion::new(len);
        let mut header = TelemetryHeader {
            ver: HEADER_VERSION,
            status: STATUS_CONNECTED,
            tick_rate: self.tick_rate,
            session_info_offset: session_offset as i32,
            var_header_offset: var_header_offset as i32,
            num_buf: self.num_buf as i32,
            ..TelemetryHeader::default()
        };
        for (index, slot) in header.slots.iter_mut().take(self.num_buf).enumerate() {
            *slot = SlotDescriptor { tick_count: 0, buf_offset: (data_offset + index * slot_stride) as i32 };
        }

        let mut writer = SimulatedWriter {
            bytes,
            header,
            max_vars: self.max_vars,
            buf_capacity,
            session_capacity: self.session_capacity,
            next_tick: 1,
        };
        writer.replace_schema(&self.variables, self.buf_len)?;
        if !self.session_text.is_empty() {
            writer.publish_session(&self.session_text)?;
        }
        Ok((region, writer))
    }
}

/// In-process writer for an [`InMemoryRegion`].
///
/// Samples go into the slot with the oldest tick. The slot's tick is cleared
/// before its data changes and set afterwards, so a reader racing the writer
/// sees a tick change across any overwrite.
#[derive(Debug)]
pub struct SimulatedWriter {
    bytes: RegionWriter,
    header: TelemetryHeader,
    max_vars: usize,
    buf_capacity: usize,
    session_capacity: usize,
    next_tick: i32,
}

impl SimulatedWriter {
    pub fn builder() -> WriterBuilder {
        WriterBuilder::default()
    }

    pub fn header(&self) -> &TelemetryHeader {
        &self.header
    }

    /// Publish a new variable-header table and sample length.
    pub fn replace_schema(&mut self, variables: &[VariableInfo], buf_len: usize) -> Result<()> {
        if variables.len() > self.max_vars {
            return Err(TelemetryError::buffer_operation_error(
                format!("{} variables exceed capacity {}", variables.len(), self.max_vars),
                None,
            ));
        }
        if buf_len > self.buf_capacity {
            return Err(TelemetryError::buffer_operation_error(
                format!("sample length {buf_len} exceeds slot capacity {}", self.buf_capacity),
                None,
            ));
        }
        let table: Vec<u8> = variables.iter().flat_map(encode_var_header).collect();
        self.bytes.write(self.header.var_header_offset as usize, &table)?;
        self.header.num_vars = variables.len() as i32;
        self.header.buf_len = buf_len as i32;
        self.flush_header()
    }

    /// Replace the session text and bump its generation marker.
    pub fn publish_session(&mut self, text: &str) -> Result<()> {
        if text.len() >= self.session_capacity {
            return Err(TelemetryError::buffer_operation_error(
                format!("session text of {} bytes exceeds capacity {}", text.len(), self.session_capacity),
                None,
            ));
        }
        let mut padded = Vec::with_capacity(text.len() + 1);
        padded.extend_from_slice(text.as_bytes());
        padded.push(0);
        self.bytes.write(self.header.session_info_offset as usize, &padded)?;
        self.header.session_info_len = padded.len() as i32;
        self.header.session_info_update += 1;
        self.flush_header()
    }

    /// Publish a sample with the next tick. Returns the tick and slot used.
    pub fn publish(&mut self, sample: &[u8]) -> Result<(i32, usize)> {
        let tick = self.next_tick;
        let slot = self.publish_with_tick(tick, sample)?;
        Ok((tick, slot))
    }

    /// Publish a sample with an explicit tick; later ticks continue from it.
    pub fn publish_with_tick(&mut self, tick: i32, sample: &[u8]) -> Result<usize> {
        let slot = self.oldest_slot();
        self.publish_to_slot(slot, tick, sample)?;
        self.next_tick = tick.wrapping_add(1);
        Ok(slot)
    }

    /// Overwrite a specific slot.
    pub fn publish_to_slot(&mut self, slot: usize, tick: i32, sample: &[u8]) -> Result<()> {
        let buf_len = self.header.buf_len as usize;
        if slot >= self.header.num_buf as usize || sample.len() != buf_len {
            return Err(TelemetryError::buffer_operation_error(
                format!("sample of {} bytes for slot {slot}, expected {buf_len}", sample.len()),
                Some(slot),
            ));
        }
        let tick_offset = slot_tick_offset(slot);
        self.bytes.write_i32(tick_offset, i32::MIN)?;
        self.bytes.write(self.header.slots[slot].buf_offset as usize, sample)?;
        self.bytes.write_i32(tick_offset, tick)?;
        self.header.slots[slot].tick_count = tick;
        Ok(())
    }

    /// Simulate a writer restart: every slot tick drops back to zero.
    pub fn restart(&mut self) -> Result<()> {
        for slot in 0..self.header.num_buf as usize {
            self.bytes.write_i32(slot_tick_offset(slot), 0)?;
            self.header.slots[slot].tick_count = 0;
        }
        self.next_tick = 1;
        Ok(())
    }

    pub fn set_connected(&mut self, connected: bool) -> Result<()> {
        if connected {
            self.header.status |= STATUS_CONNECTED;
        } else {
            self.header.status &= !STATUS_CONNECTED;
        }
        self.bytes.write_i32(4, self.header.status)
    }

    fn oldest_slot(&self) -> usize {
        self.header.slots[..self.header.num_buf as usize]
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| slot.tick_count)
            .map_or(0, |(index, _)| index)
    }

    /// Rewrite the scalar fields; slot descriptors are written individually.
    fn flush_header(&self) -> Result<()> {
        let bytes = self.header.to_bytes();
        self.bytes.write(0, &bytes[..SLOT_TABLE_OFFSET])?;
        for index in 0..self.header.num_buf as usize {
            let base = SLOT_TABLE_OFFSET + index * SLOT_DESCRIPTOR_SIZE;
            self.bytes.write(base + 4, &bytes[base + 4..base + 8])?;
        }
        Ok(())
    }
}
