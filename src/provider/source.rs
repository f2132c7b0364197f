//! Where samples come from.
//!
//! A [`SampleSource`] hides whether samples arrive from the writer's shared
//! memory ([`LiveSource`]) or from a recorded capture ([`RecordedSource`]).
//! Both refuse to hand out samples until their current schema has been
//! decoded, so the provider drives them through one path.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::ReaderConfig;
use crate::ibt::IbtReader;
use crate::memory::{BufferReader, SharedRegion};
use crate::observe::{TelemetryEvent, TelemetrySink};
use crate::{Result, TelemetryError, VariableSchema};

/// Kind of source a provider is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Live,
    Recorded,
}

impl SourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Live => "live",
            SourceKind::Recorded => "recorded",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pull from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulled {
    /// The scratch buffer holds a new sample.
    Sample { index: usize, tick: i32 },
    /// Nothing newer than the last sample.
    Pending,
    /// The writer started over; ticks restart from a lower value.
    Restarted,
    /// A recorded source has no samples left.
    Exhausted,
}

/// A stream of raw samples plus the schema and session text describing them.
pub trait SampleSource: Send {
    fn kind(&self) -> SourceKind;

    /// Decode the current variable schema and accept it. With `previous`,
    /// a variable whose type changed is rejected.
    fn decode_schema(&mut self, previous: Option<&VariableSchema>) -> Result<VariableSchema>;

    /// Withdraw the last accepted schema; pulls fail with `SchemaChanged`
    /// until the next successful decode.
    fn reject_schema(&mut self);

    /// Copy the next sample into `scratch`.
    fn pull(&mut self, scratch: &mut [u8]) -> Result<Pulled>;

    /// Generation marker of the session text.
    fn session_generation(&mut self) -> Result<i32>;

    fn session_text(&mut self) -> Result<Option<String>>;

    /// Reposition so the next pull returns sample `index`.
    fn seek(&mut self, index: usize) -> bool {
        let _ = index;
        false
    }

    /// Number of addressable samples; 0 when unknown.
    fn sample_count(&self) -> usize {
        0
    }

    fn is_exhausted(&self) -> bool {
        false
    }

    fn tick_rate(&self) -> Option<f64>;

    /// Wait briefly for the writer to signal new data.
    fn wait_for_data(&self) -> bool {
        true
    }
}

/// Opens the shared region a [`LiveSource`] reads from.
pub type RegionOpener = Box<dyn FnMut() -> Result<Box<dyn SharedRegion>> + Send>;

/// Map the simulator's telemetry region.
///
/// Only Windows publishes one; elsewhere this always reports
/// [`TelemetryError::BufferUnavailable`].
pub fn open_system_region() -> Result<Box<dyn SharedRegion>> {
    #[cfg(windows)]
    {
        Ok(Box::new(crate::windows::MappedRegion::open()?))
    }
    #[cfg(not(windows))]
    {
        Err(TelemetryError::buffer_unavailable("shared-memory telemetry is only published on Windows"))
    }
}

/// Samples from a writer's shared region.
///
/// The region is opened lazily. Each call that needs it and finds it missing
/// makes exactly one open attempt and reports the failure; nothing loops.
pub struct LiveSource {
    opener: RegionOpener,
    reader: Option<BufferReader<Box<dyn SharedRegion>>>,
    config: ReaderConfig,
    sink: Arc<dyn TelemetrySink>,
    samples_read: usize,
}

impl LiveSource {
    pub fn new(opener: RegionOpener, config: ReaderConfig, sink: Arc<dyn TelemetrySink>) -> Self {
        Self { opener, reader: None, config, sink, samples_read: 0 }
    }

    /// Source over the simulator's own region.
    pub fn system(config: ReaderConfig, sink: Arc<dyn TelemetrySink>) -> Self {
        Self::new(Box::new(open_system_region), config, sink)
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn reader(&mut self) -> Result<&mut BufferReader<Box<dyn SharedRegion>>> {
        if self.reader.is_none() {
            match (self.opener)() {
                Ok(region) => {
                    debug!(bytes = region.len(), "shared region opened");
                    self.reader = Some(BufferReader::new(region, self.config, Arc::clone(&self.sink)));
                }
                Err(err) => {
                    self.sink.record(TelemetryEvent::SourceUnavailable { reason: err.to_string() });
                    return Err(err);
                }
            }
        }
        self.reader.as_mut().ok_or_else(|| TelemetryError::buffer_unavailable("shared region not open"))
    }
}

impl SampleSource for LiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn decode_schema(&mut self, previous: Option<&VariableSchema>) -> Result<VariableSchema> {
        let reader = self.reader()?;
        match previous {
            Some(previous) => reader.decode_schema_against(previous),
            None => reader.decode_schema(),
        }
    }

    fn reject_schema(&mut self) {
        if let Some(reader) = self.reader.as_mut() {
            reader.reset_schema();
        }
    }

    fn pull(&mut self, scratch: &mut [u8]) -> Result<Pulled> {
        let reader = self.reader()?;
        let had_sample = reader.last_tick().is_some();
        if !reader.read_into(scratch)? {
            return Ok(if had_sample && reader.last_tick().is_none() {
                Pulled::Restarted
            } else {
                Pulled::Pending
            });
        }
        let tick = reader.last_tick().unwrap_or_default();
        let index = self.samples_read;
        self.samples_read += 1;
        Ok(Pulled::Sample { index, tick })
    }

    fn session_generation(&mut self) -> Result<i32> {
        self.reader()?.session_generation()
    }

    fn session_text(&mut self) -> Result<Option<String>> {
        self.reader()?.session_text()
    }

    fn tick_rate(&self) -> Option<f64> {
        let header = self.reader.as_ref()?.header().ok()?;
        Some(f64::from(header.tick_rate))
    }

    fn wait_for_data(&self) -> bool {
        self.reader.as_ref().is_some_and(|reader| reader.wait_for_data())
    }
}

impl fmt::Debug for LiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSource")
            .field("open", &self.is_open())
            .field("samples_read", &self.samples_read)
            .finish()
    }
}

/// Samples replayed from a recorded capture.
#[derive(Debug)]
pub struct RecordedSource {
    reader: IbtReader,
    accepted: bool,
}

impl RecordedSource {
    pub fn new(reader: IbtReader) -> Self {
        Self { reader, accepted: false }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(IbtReader::open(path)?))
    }

    pub fn reader(&self) -> &IbtReader {
        &self.reader
    }
}

impl SampleSource for RecordedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Recorded
    }

    fn decode_schema(&mut self, previous: Option<&VariableSchema>) -> Result<VariableSchema> {
        let schema = self.reader.schema().clone();
        if let Some(previous) = previous {
            for info in schema.iter() {
                if let Some(old) = previous.get(&info.name).filter(|old| old.data_type != info.data_type) {
                    return Err(TelemetryError::malformed_schema(
                        &info.name,
                        format!("type changed from {:?} to {:?}", old.data_type, info.data_type),
                    ));
                }
            }
        }
        self.accepted = true;
        Ok(schema)
    }

    fn reject_schema(&mut self) {
        self.accepted = false;
    }

    fn pull(&mut self, scratch: &mut [u8]) -> Result<Pulled> {
        if !self.accepted {
            return Err(TelemetryError::SchemaChanged {
                from: "none".to_string(),
                to: format!("capture {}", self.reader.path().display()),
            });
        }
        match self.reader.read_frame_into(scratch)? {
            Some(frame) => {
                trace!(index = frame.index, tick = frame.tick, "record replayed");
                Ok(Pulled::Sample { index: frame.index, tick: frame.tick })
            }
            None => Ok(Pulled::Exhausted),
        }
    }

    fn session_generation(&mut self) -> Result<i32> {
        Ok(self.reader.header().session_info_update)
    }

    fn session_text(&mut self) -> Result<Option<String>> {
        self.reader.session_text()
    }

    fn seek(&mut self, index: usize) -> bool {
        self.reader.seek_to_frame(index).is_ok()
    }

    fn sample_count(&self) -> usize {
        self.reader.total_frames()
    }

    fn is_exhausted(&self) -> bool {
        self.reader.current_frame() >= self.reader.total_frames()
    }

    fn tick_rate(&self) -> Option<f64> {
        Some(self.reader.tick_rate())
    }
}
