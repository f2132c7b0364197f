//! Writer header parsing.
//!
//! The writer publishes a fixed little-endian header at the start of the
//! shared region:
//!
//! ```text
//! offset  field
//!      0  ver                 (2)
//!      4  status              bit 0x1 = connected
//!      8  tick_rate
//!     12  session_info_update generation marker of the session text
//!     16  session_info_len
//!     20  session_info_offset
//!     24  num_vars
//!     28  var_header_offset
//!     32  num_buf             <= 4
//!     36  buf_len
//!     40  pad[2]
//!     48  slot[4]             { tick_count, buf_offset, pad[2] } x 16 bytes
//! ```
//!
//! Slots rotate: the writer fills the slot with the oldest tick while readers
//! copy the newest one. `(num_vars, var_header_offset, buf_len)` identifies a
//! schema generation; see [`SchemaFingerprint`].

use std::fmt;
use std::ops::Range;

use tracing::trace;

use crate::{Result, TelemetryError};

pub const HEADER_VERSION: i32 = 2;
pub const STATUS_CONNECTED: i32 = 0x1;
pub const HEADER_SIZE: usize = 112;
pub const SLOT_TABLE_OFFSET: usize = 48;
pub const SLOT_DESCRIPTOR_SIZE: usize = 16;
pub const MAX_SLOTS: usize = 4;
pub const VAR_HEADER_SIZE: usize = 144;

/// One rotating sample slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub tick_count: i32,
    pub buf_offset: i32,
}

/// Parsed writer header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryHeader {
    pub ver: i32,
    pub status: i32,
    pub tick_rate: i32,
    pub session_info_update: i32,
    pub session_info_len: i32,
    pub session_info_offset: i32,
    pub num_vars: i32,
    pub var_header_offset: i32,
    pub num_buf: i32,
    pub buf_len: i32,
    pub slots: [SlotDescriptor; MAX_SLOTS],
}

/// Identity of a variable-header generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaFingerprint {
    pub num_vars: i32,
    pub var_header_offset: i32,
    pub buf_len: i32,
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vars @ {:#x}, {} bytes/sample", self.num_vars, self.var_header_offset, self.buf_len)
    }
}

impl TelemetryHeader {
    /// Parse the header from the first [`HEADER_SIZE`] bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(TelemetryError::Memory { offset: bytes.len() });
        }
        let field = |index: usize| read_i32_le(bytes, index * 4).unwrap_or_default();

        let mut slots = [SlotDescriptor::default(); MAX_SLOTS];
        for (index, slot) in slots.iter_mut().enumerate() {
            let base = SLOT_TABLE_OFFSET + index * SLOT_DESCRIPTOR_SIZE;
            slot.tick_count = read_i32_le(bytes, base).unwrap_or_default();
            slot.buf_offset = read_i32_le(bytes, base + 4).unwrap_or_default();
        }

        let header = Self {
            ver: field(0),
            status: field(1),
            tick_rate: field(2),
            session_info_update: field(3),
            session_info_len: field(4),
            session_info_offset: field(5),
            num_vars: field(6),
            var_header_offset: field(7),
            num_buf: field(8),
            buf_len: field(9),
            slots,
        };
        trace!(ver = header.ver, num_vars = header.num_vars, num_buf = header.num_buf, "parsed header");
        Ok(header)
    }

    /// Check version and that every count and offset is usable.
    pub fn validate(&self) -> Result<()> {
        if self.ver != HEADER_VERSION {
            return Err(TelemetryError::Version {
                expected: HEADER_VERSION as u32,
                found: self.ver as u32,
            });
        }
        let fields = [
            ("num_vars", self.num_vars),
            ("var_header_offset", self.var_header_offset),
            ("buf_len", self.buf_len),
            ("session_info_len", self.session_info_len),
            ("session_info_offset", self.session_info_offset),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, value)| *value < 0) {
            return Err(TelemetryError::malformed_schema("header", format!("{name} is negative ({value})")));
        }
        if !(0..=MAX_SLOTS as i32).contains(&self.num_buf) {
            return Err(TelemetryError::malformed_schema(
                "header",
                format!("num_buf {} outside 0..={MAX_SLOTS}", self.num_buf),
            ));
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.status & STATUS_CONNECTED != 0
    }

    pub fn fingerprint(&self) -> SchemaFingerprint {
        SchemaFingerprint {
            num_vars: self.num_vars,
            var_header_offset: self.var_header_offset,
            buf_len: self.buf_len,
        }
    }

    /// Slots to consider: the writer's count, capped by `limit` and [`MAX_SLOTS`].
    pub fn slot_count(&self, limit: usize) -> usize {
        (self.num_buf.max(0) as usize).min(limit).min(MAX_SLOTS)
    }

    /// Index and descriptor of the slot with the highest tick.
    pub fn newest_slot(&self, limit: usize) -> Option<(usize, SlotDescriptor)> {
        self.slots[..self.slot_count(limit)]
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, slot)| slot.tick_count)
    }

    /// Byte range of the variable-header table.
    pub fn var_headers_range(&self) -> Range<usize> {
        let start = self.var_header_offset.max(0) as usize;
        start..start.saturating_add((self.num_vars.max(0) as usize).saturating_mul(VAR_HEADER_SIZE))
    }

    /// Byte range of the session text.
    pub fn session_range(&self) -> Range<usize> {
        let start = self.session_info_offset.max(0) as usize;
        start..start.saturating_add(self.session_info_len.max(0) as usize)
    }

    /// Serialize in the writer layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let fields = [
            self.ver,
            self.status,
            self.tick_rate,
            self.session_info_update,
            self.session_info_len,
            self.session_info_offset,
            self.num_vars,
            self.var_header_offset,
            self.num_buf,
            self.buf_len,
        ];
        for (index, value) in fields.iter().enumerate() {
            bytes[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        for (index, slot) in self.slots.iter().enumerate() {
            let base = SLOT_TABLE_OFFSET + index * SLOT_DESCRIPTOR_SIZE;
            bytes[base..base + 4].copy_from_slice(&slot.tick_count.to_le_bytes());
            bytes[base + 4..base + 8].copy_from_slice(&slot.buf_offset.to_le_bytes());
        }
        bytes
    }
}

/// Byte offset of slot `index`'s tick counter within the header.
pub const fn slot_tick_offset(index: usize) -> usize {
    SLOT_TABLE_OFFSET + index * SLOT_DESCRIPTOR_SIZE
}

pub(crate) fn read_i32_le(data: &[u8], offset: usize) -> Option<i32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub(crate) fn read_i64_le(data: &[u8], offset: usize) -> Option<i64> {
    let bytes: [u8; 8] = data.get(offset..offset.checked_add(8)?)?.try_into().ok()?;
    Some(i64::from_le_bytes(bytes))
}

pub(crate) fn read_f64_le(data: &[u8], offset: usize) -> Option<f64> {
    let bytes: [u8; 8] = data.get(offset..offset.checked_add(8)?)?.try_into().ok()?;
    Some(f64::from_le_bytes(bytes))
}

/// Text up to the first NUL, lossily decoded.
pub(crate) fn c_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}
