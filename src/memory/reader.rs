//! Consistent sample reads from a region the writer keeps changing.
//!
//! The writer rotates samples through up to four slots, each tagged with the
//! tick it was written at. A read picks the slot with the newest tick, copies
//! it, and re-reads that slot's tick: if the tick moved, the writer overwrote
//! the slot mid-copy and the copy is discarded. Retries are bounded by
//! [`ReaderConfig::retry_budget`].

use std::sync::Arc;

use tracing::trace;

use crate::config::ReaderConfig;
use crate::observe::{TelemetryEvent, TelemetrySink};
use crate::schema::header::{HEADER_SIZE, SchemaFingerprint, TelemetryHeader, slot_tick_offset};
use crate::schema::{decode, decode_against};
use crate::{Result, TelemetryError, VariableSchema};

use super::region::SharedRegion;

/// Marker for "no sample read yet".
const NO_TICK: i32 = i32::MAX;

/// Reads samples, schema and session text out of a [`SharedRegion`].
pub struct BufferReader<R: SharedRegion> {
    region: R,
    config: ReaderConfig,
    sink: Arc<dyn TelemetrySink>,
    last_tick: i32,
    acknowledged: Option<SchemaFingerprint>,
}

impl<R: SharedRegion> BufferReader<R> {
    pub fn new(region: R, config: ReaderConfig, sink: Arc<dyn TelemetrySink>) -> Self {
        Self { region, config, sink, last_tick: NO_TICK, acknowledged: None }
    }

    /// Current writer header, validated.
    pub fn header(&self) -> Result<TelemetryHeader> {
        let mut bytes = [0u8; HEADER_SIZE];
        if !self.region.read_into(0, &mut bytes) {
            return Err(TelemetryError::Memory { offset: self.region.len() });
        }
        let header = TelemetryHeader::parse(&bytes)?;
        header.validate()?;
        Ok(header)
    }

    /// Tick of the newest slot.
    pub fn latest_version(&self) -> Result<i32> {
        let header = self.header()?;
        header
            .newest_slot(self.config.slot_count)
            .map(|(_, slot)| slot.tick_count)
            .ok_or_else(|| TelemetryError::buffer_operation_error("writer publishes no sample slots", None))
    }

    /// Tick of the last sample returned, if any.
    pub fn last_tick(&self) -> Option<i32> {
        (self.last_tick != NO_TICK).then_some(self.last_tick)
    }

    /// Copy the most recent consistent sample into `scratch`.
    ///
    /// Returns `Ok(false)` when there is nothing new: the writer is
    /// disconnected, the newest tick was already read, or ticks went
    /// backwards (the writer restarted; the next sample is accepted).
    ///
    /// Fails with [`TelemetryError::SchemaChanged`] until [`Self::decode_schema`]
    /// has acknowledged the current schema generation, and with
    /// [`TelemetryError::TornRead`] when every attempt was overwritten mid-copy.
    pub fn read_into(&mut self, scratch: &mut [u8]) -> Result<bool> {
        let budget = self.config.retry_budget.max(1);
        let mut attempt = 1;
        loop {
            let header = self.header()?;
            if !header.is_connected() {
                return Ok(false);
            }
            self.check_generation(&header)?;

            let buf_len = header.buf_len as usize;
            if scratch.len() < buf_len {
                return Err(TelemetryError::buffer_operation_error(
                    format!("scratch of {} bytes is shorter than sample length {buf_len}", scratch.len()),
                    None,
                ));
            }
            let (slot, descriptor) = header.newest_slot(self.config.slot_count).ok_or_else(|| {
                TelemetryError::buffer_operation_error("writer publishes no sample slots", None)
            })?;

            let tick = descriptor.tick_count;
            if self.last_tick != NO_TICK {
                if tick == self.last_tick {
                    return Ok(false);
                }
                if tick < self.last_tick {
                    self.sink.record(TelemetryEvent::WriterRestarted { last_tick: self.last_tick, tick });
                    self.last_tick = NO_TICK;
                    return Ok(false);
                }
            }

            let start = usize::try_from(descriptor.buf_offset).map_err(|_| {
                TelemetryError::malformed_schema(format!("slot {slot}"), "negative buffer offset")
            })?;
            if start.checked_add(buf_len).is_none_or(|end| end > self.region.len()) {
                return Err(TelemetryError::malformed_schema(
                    format!("slot {slot}"),
                    format!("{buf_len} bytes at {start:#x} exceed region of {} bytes", self.region.len()),
                ));
            }
            if !self.region.read_into(start, &mut scratch[..buf_len]) {
                return Err(TelemetryError::Memory { offset: start });
            }

            let after = self
                .region
                .read_i32(slot_tick_offset(slot))
                .ok_or(TelemetryError::Memory { offset: slot_tick_offset(slot) })?;
            if after == tick {
                trace!(tick, slot, attempt, "sample copied");
                self.last_tick = tick;
                return Ok(true);
            }

            self.sink.record(TelemetryEvent::TornRead { attempt, slot });
            if attempt >= budget {
                return Err(TelemetryError::TornRead { attempts: attempt });
            }
            attempt += 1;
        }
    }

    /// Decode the current variable-header table and accept its generation.
    pub fn decode_schema(&mut self) -> Result<VariableSchema> {
        self.decode_with(None)
    }

    /// Like [`Self::decode_schema`], rejecting type changes relative to `previous`.
    pub fn decode_schema_against(&mut self, previous: &VariableSchema) -> Result<VariableSchema> {
        self.decode_with(Some(previous))
    }

    /// Forget the accepted generation; reads fail with `SchemaChanged` until
    /// the next successful decode.
    pub fn reset_schema(&mut self) {
        self.acknowledged = None;
    }

    /// Generation marker of the session text.
    pub fn session_generation(&self) -> Result<i32> {
        Ok(self.header()?.session_info_update)
    }

    /// Session text, cut at the first NUL. `None` when the writer publishes none.
    pub fn session_text(&self) -> Result<Option<String>> {
        let header = self.header()?;
        let range = header.session_range();
        if range.is_empty() {
            return Ok(None);
        }
        if range.end > self.region.len() {
            return Err(TelemetryError::Memory { offset: range.start });
        }
        let mut bytes = vec![0u8; range.len()];
        if !self.region.read_into(range.start, &mut bytes) {
            return Err(TelemetryError::Memory { offset: range.start });
        }
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        bytes.truncate(len);
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Block for at most the configured poll timeout waiting for new data.
    pub fn wait_for_data(&self) -> bool {
        self.region.wait_for_data(self.config.poll_timeout())
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    fn check_generation(&mut self, header: &TelemetryHeader) -> Result<()> {
        let current = header.fingerprint();
        match self.acknowledged {
            Some(accepted) if accepted == current => Ok(()),
            Some(accepted) => {
                self.sink.record(TelemetryEvent::SchemaChanged { from: accepted, to: current });
                Err(TelemetryError::SchemaChanged { from: accepted.to_string(), to: current.to_string() })
            }
            None => Err(TelemetryError::SchemaChanged { from: "none".to_string(), to: current.to_string() }),
        }
    }

    fn decode_with(&mut self, previous: Option<&VariableSchema>) -> Result<VariableSchema> {
        let header = self.header()?;
        let range = header.var_headers_range();
        if range.end > self.region.len() {
            return Err(TelemetryError::malformed_schema(
                "header",
                format!(
                    "{} variable headers at {:#x} extend past the region of {} bytes",
                    header.num_vars,
                    range.start,
                    self.region.len()
                ),
            ));
        }
        let mut raw = vec![0u8; range.len()];
        if !self.region.read_into(range.start, &mut raw) {
            return Err(TelemetryError::Memory { offset: range.start });
        }
        let num_vars = header.num_vars as usize;
        let buf_len = header.buf_len as usize;
        let schema = match previous {
            Some(previous) => decode_against(previous, &raw, num_vars, buf_len)?,
            None => decode(&raw, num_vars, buf_len)?,
        };
        self.acknowledged = Some(header.fingerprint());
        Ok(schema)
    }
}

impl<R: SharedRegion> std::fmt::Debug for BufferReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferReader")
            .field("config", &self.config)
            .field("last_tick", &self.last_tick())
            .field("acknowledged", &self.acknowledged)
            .finish()
    }
}
