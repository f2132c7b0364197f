//! Uniform access to live and recorded telemetry.
//!
//! A [`SessionDataProvider`] is bound once to a [`SampleSource`] and then
//! advanced one sample at a time. It owns the current variable schema and
//! session description and republishes them as `Arc` snapshots whenever the
//! source moves to a new generation:
//!
//! ```rust
//! use std::sync::Arc;
//! use paddock::memory::{SharedRegion, SimulatedWriter};
//! use paddock::observe::NullSink;
//! use paddock::provider::SessionDataProvider;
//! use paddock::{ProviderConfig, VariableInfo, VariableType};
//!
//! let (region, mut writer) = SimulatedWriter::builder()
//!     .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
//!     .buf_len(4)
//!     .session_text("WeekendInfo:\n  TrackName: okayama full\n")
//!     .build()?;
//! writer.publish(&42.5f32.to_le_bytes())?;
//!
//! let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
//! let mut region = Some(region);
//! provider.bind_live(Box::new(move || {
//!     region
//!         .take()
//!         .map(|region| Box::new(region) as Box<dyn SharedRegion>)
//!         .ok_or_else(|| paddock::TelemetryError::buffer_unavailable("region already taken"))
//! }))?;
//!
//! let sample = provider.advance()?.expect("first sample");
//! assert_eq!(sample.value::<f32>("Speed")?, 42.5);
//! assert_eq!(provider.session().unwrap().weekend_info.track_name, "okayama full");
//! # Ok::<(), paddock::TelemetryError>(())
//! ```
//!
//! Failures to decode a schema or parse a session description are scoped:
//! the previous snapshot stays published and the sink is told why.

mod source;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace, warn};

pub use source::{
    LiveSource, Pulled, RecordedSource, RegionOpener, SampleSource, SourceKind, open_system_region,
};

use crate::config::ProviderConfig;
use crate::observe::{TelemetryEvent, TelemetrySink};
use crate::session::{SessionCache, SessionDescription};
use crate::sync::SnapshotCell;
use crate::types::VarData;
use crate::{Result, TelemetryError, VariableSchema};

/// One consistent sample and the schema that describes it.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Position within a recorded capture, or the running count for a live source.
    pub index: usize,
    pub tick: i32,
    pub data: Arc<[u8]>,
    pub schema: Arc<VariableSchema>,
}

impl Sample {
    /// Typed value of the variable `name`.
    pub fn value<T: VarData>(&self, name: &str) -> Result<T> {
        self.schema.extract(&self.data, name)
    }
}

/// Cursor over the bound source.
///
/// `sample_index < sample_count` whenever `sample_count > 0`; a live source
/// reports a count of 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub sample_index: usize,
    pub sample_count: usize,
}

/// Lifecycle of a [`SessionDataProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Uninitialized,
    Bound(SourceKind),
    Active,
    Closed,
}

impl ProviderState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProviderState::Uninitialized => "uninitialized",
            ProviderState::Bound(SourceKind::Live) => "bound(live)",
            ProviderState::Bound(SourceKind::Recorded) => "bound(recorded)",
            ProviderState::Active => "active",
            ProviderState::Closed => "closed",
        }
    }
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct SessionDataProvider {
    config: ProviderConfig,
    sink: Arc<dyn TelemetrySink>,
    state: ProviderState,
    source: Option<Box<dyn SampleSource>>,
    scratch: Vec<u8>,
    schema: Arc<SnapshotCell<VariableSchema>>,
    session: Arc<SnapshotCell<SessionDescription>>,
    sessions: SessionCache,
    current: Option<Sample>,
    last_tick: Option<i32>,
    cursor: Cursor,
}

impl SessionDataProvider {
    pub fn new(config: ProviderConfig, sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            config,
            sink,
            state: ProviderState::Uninitialized,
            source: None,
            scratch: Vec::new(),
            schema: Arc::new(SnapshotCell::new()),
            session: Arc::new(SnapshotCell::new()),
            sessions: SessionCache::new(),
            current: None,
            last_tick: None,
            cursor: Cursor::default(),
        }
    }

    /// Bind to a writer's shared region, opened through `opener`.
    pub fn bind_live(&mut self, opener: RegionOpener) -> Result<()> {
        let source = LiveSource::new(opener, self.config.reader, Arc::clone(&self.sink));
        self.bind(Box::new(source))
    }

    /// Bind to the simulator's own shared region.
    pub fn bind_system(&mut self) -> Result<()> {
        let source = LiveSource::system(self.config.reader, Arc::clone(&self.sink));
        self.bind(Box::new(source))
    }

    /// Bind to a recorded capture on disk.
    pub fn bind_recorded(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.expect_state("bind_recorded", |state| state == ProviderState::Uninitialized)?;
        let source = RecordedSource::open(path)?;
        self.bind(Box::new(source))
    }

    pub fn bind(&mut self, source: Box<dyn SampleSource>) -> Result<()> {
        self.expect_state("bind", |state| state == ProviderState::Uninitialized)?;
        self.config.validate()?;
        let kind = source.kind();
        self.cursor = Cursor { sample_index: 0, sample_count: source.sample_count() };
        self.source = Some(source);
        self.transition(ProviderState::Bound(kind));
        Ok(())
    }

    /// Pull the next sample.
    ///
    /// `Ok(None)` when the source has nothing newer, the writer restarted, or
    /// a recorded capture is exhausted. A live sample with a tick older than
    /// the last one returned is dropped; recorded samples follow record order
    /// whatever their ticks.
    pub fn advance(&mut self) -> Result<Option<Sample>> {
        self.expect_state("advance", |state| {
            matches!(state, ProviderState::Bound(_) | ProviderState::Active)
        })?;
        if let ProviderState::Bound(_) = self.state {
            self.transition(ProviderState::Active);
        }

        let pulled = match self.pull() {
            Err(TelemetryError::SchemaChanged { from, to }) => {
                debug!(%from, %to, "refreshing schema");
                self.refresh_schema()?;
                self.pull()?
            }
            other => other?,
        };

        let (index, tick) = match pulled {
            Pulled::Sample { index, tick } => (index, tick),
            Pulled::Restarted => {
                self.last_tick = None;
                return Ok(None);
            }
            Pulled::Pending | Pulled::Exhausted => return Ok(None),
        };
        if let Some(last) = self.last_tick.filter(|&last| tick < last) {
            match self.source_kind() {
                Some(SourceKind::Live) => {
                    trace!(tick, last, "dropping older sample");
                    return Ok(None);
                }
                _ => warn!(index, tick, last, "recorded tick went backwards; keeping record order"),
            }
        }

        let schema = self.schema.load().ok_or_else(|| TelemetryError::InvalidState {
            operation: "advance",
            state: "no schema published".to_string(),
        })?;
        let sample = Sample {
            index,
            tick,
            data: Arc::from(&self.scratch[..schema.buf_len()]),
            schema,
        };
        self.last_tick = Some(tick);
        self.cursor.sample_index = index;
        self.current = Some(sample.clone());

        if self.config.parse_session {
            self.refresh_session();
        }
        Ok(Some(sample))
    }

    /// Move a recorded cursor so the next [`Self::advance`] returns sample
    /// `index`. Always `false` for a live source.
    pub fn seek(&mut self, index: usize) -> bool {
        if !matches!(self.state, ProviderState::Bound(_) | ProviderState::Active) {
            return false;
        }
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        if index >= source.sample_count() || !source.seek(index) {
            return false;
        }
        self.cursor.sample_index = index;
        self.last_tick = None;
        true
    }

    pub fn sample_index(&self) -> usize {
        self.cursor.sample_index
    }

    pub fn sample_count(&self) -> usize {
        self.cursor.sample_count
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn state(&self) -> ProviderState {
        self.state
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.source.as_ref().map(|source| source.kind())
    }

    /// Whether a recorded source has handed out its last sample.
    pub fn is_exhausted(&self) -> bool {
        self.source.as_ref().is_some_and(|source| source.is_exhausted())
    }

    pub fn tick_rate(&self) -> Option<f64> {
        self.source.as_ref().and_then(|source| source.tick_rate())
    }

    /// Wait for the writer's data-ready signal, bounded by the configured
    /// poll timeout. Recorded sources never wait.
    pub fn wait_for_data(&self) -> bool {
        self.source.as_ref().is_some_and(|source| source.wait_for_data())
    }

    pub fn schema(&self) -> Option<Arc<VariableSchema>> {
        self.schema.load()
    }

    pub fn session(&self) -> Option<Arc<SessionDescription>> {
        self.session.load()
    }

    /// Shared handle other threads can load schema snapshots from.
    pub fn schema_handle(&self) -> Arc<SnapshotCell<VariableSchema>> {
        Arc::clone(&self.schema)
    }

    pub fn session_handle(&self) -> Arc<SnapshotCell<SessionDescription>> {
        Arc::clone(&self.session)
    }

    /// Most recent sample returned by [`Self::advance`].
    pub fn current(&self) -> Option<&Sample> {
        self.current.as_ref()
    }

    /// Typed value of `name` in the current sample.
    pub fn value<T: VarData>(&self, name: &str) -> Result<T> {
        self.current
            .as_ref()
            .ok_or_else(|| TelemetryError::InvalidState {
                operation: "value",
                state: format!("{} without a sample", self.state),
            })?
            .value(name)
    }

    /// Release the source. Published snapshots are withdrawn; handles
    /// obtained earlier see empty cells.
    pub fn close(&mut self) {
        if self.state == ProviderState::Closed {
            return;
        }
        self.source = None;
        self.current = None;
        self.scratch = Vec::new();
        self.schema.clear();
        self.session.clear();
        self.sessions.clear();
        self.cursor = Cursor::default();
        self.transition(ProviderState::Closed);
    }

    fn pull(&mut self) -> Result<Pulled> {
        let source = self.source.as_mut().ok_or_else(|| TelemetryError::InvalidState {
            operation: "advance",
            state: "no source".to_string(),
        })?;
        source.pull(&mut self.scratch)
    }

    fn refresh_schema(&mut self) -> Result<()> {
        let source = self.source.as_mut().ok_or_else(|| TelemetryError::InvalidState {
            operation: "advance",
            state: "no source".to_string(),
        })?;
        let previous = self.schema.load();
        let decoded = source.decode_schema(previous.as_deref()).and_then(|schema| {
            if self.config.check_known_variables {
                schema.check_known()?;
            }
            Ok(schema)
        });
        match decoded {
            Ok(schema) => {
                self.scratch.resize(schema.buf_len(), 0);
                self.cursor.sample_count = source.sample_count();
                self.sink.record(TelemetryEvent::SchemaPublished { variables: schema.len() });
                self.schema.store(Arc::new(schema));
                Ok(())
            }
            Err(err) => {
                source.reject_schema();
                self.sink.record(TelemetryEvent::SchemaRejected { reason: err.to_string() });
                Err(err)
            }
        }
    }

    fn refresh_session(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let generation = match source.session_generation() {
            Ok(generation) => generation,
            Err(err) => {
                warn!(error = %err, "session generation unavailable");
                return;
            }
        };
        if self.sessions.is_current(generation) {
            return;
        }
        match self.sessions.refresh(generation, || source.session_text()) {
            Ok(Some(description)) => {
                self.session.store(description);
                self.sink.record(TelemetryEvent::SessionPublished { generation });
            }
            Ok(None) => trace!(generation, "writer publishes no session text"),
            Err(err) => {
                self.sink.record(TelemetryEvent::SessionRejected { generation, reason: err.to_string() })
            }
        }
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: impl Fn(ProviderState) -> bool,
    ) -> Result<()> {
        if allowed(self.state) {
            Ok(())
        } else {
            Err(TelemetryError::InvalidState { operation, state: self.state.to_string() })
        }
    }

    fn transition(&mut self, to: ProviderState) {
        let from = self.state;
        self.state = to;
        self.sink.record(TelemetryEvent::StateChanged { from: from.as_str(), to: to.as_str() });
    }
}

impl fmt::Debug for SessionDataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDataProvider")
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("last_tick", &self.last_tick)
            .field("session_generation", &self.sessions.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibt::{CaptureBuilder, IbtReader};
    use crate::memory::SimulatedWriter;
    use crate::observe::{NullSink, RecordingSink};
    use crate::test_utils::{one_shot_opener, split_time_yaml};
    use crate::{VariableInfo, VariableType};

    fn live_provider(sink: Arc<dyn TelemetrySink>) -> (SessionDataProvider, SimulatedWriter) {
        let (region, writer) = SimulatedWriter::builder()
            .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
            .variable(VariableInfo::scalar("Gear", VariableType::Int32, 4))
            .buf_len(8)
            .buf_capacity(64)
            .session_text("WeekendInfo:\n  TrackName: okayama full\n")
            .build()
            .unwrap();
        let mut provider = SessionDataProvider::new(ProviderConfig::default(), sink);
        provider.bind_live(one_shot_opener(region)).unwrap();
        (provider, writer)
    }

    fn sample(speed: f32, gear: i32) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&speed.to_le_bytes());
        bytes[4..].copy_from_slice(&gear.to_le_bytes());
        bytes
    }

    fn recorded_provider(records: usize) -> SessionDataProvider {
        let capture = CaptureBuilder::new()
            .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
            .buf_len(4)
            .session_text("WeekendInfo:\n  TrackName: spa\n")
            .records((0..records).map(|i| (i as f32).to_le_bytes()))
            .build()
            .unwrap();
        let source = RecordedSource::new(IbtReader::from_bytes(capture).unwrap());
        let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
        provider.bind(Box::new(source)).unwrap();
        provider
    }

    #[test]
    fn state_machine_rejects_misuse() {
        let sink = Arc::new(RecordingSink::new());
        let mut provider = SessionDataProvider::new(ProviderConfig::default(), sink.clone());
        assert!(matches!(
            provider.advance(),
            Err(TelemetryError::InvalidState { operation: "advance", .. })
        ));

        let (mut provider, _writer) = live_provider(sink.clone());
        assert_eq!(provider.state(), ProviderState::Bound(SourceKind::Live));
        assert!(matches!(
            provider.bind_recorded("other.ibt"),
            Err(TelemetryError::InvalidState { operation: "bind_recorded", .. })
        ));

        provider.close();
        assert_eq!(provider.state(), ProviderState::Closed);
        assert!(provider.advance().is_err());
        assert_eq!(sink.count(|e| matches!(e, TelemetryEvent::StateChanged { to: "closed", .. })), 1);
    }

    #[test]
    fn first_advance_publishes_schema_and_session() {
        let sink = Arc::new(RecordingSink::new());
        let (mut provider, mut writer) = live_provider(sink.clone());
        writer.publish(&sample(42.5, 3)).unwrap();

        let first = provider.advance().unwrap().unwrap();
        assert_eq!(provider.state(), ProviderState::Active);
        assert_eq!(first.value::<f32>("Speed").unwrap(), 42.5);
        assert_eq!(provider.value::<i32>("Gear").unwrap(), 3);
        assert_eq!(provider.schema().unwrap().len(), 2);
        assert_eq!(provider.session().unwrap().weekend_info.track_name, "okayama full");
        assert!(provider.advance().unwrap().is_none());
        assert_eq!(sink.count(|e| matches!(e, TelemetryEvent::SchemaPublished { variables: 2 })), 1);
        assert_eq!(sink.count(|e| matches!(e, TelemetryEvent::SessionPublished { .. })), 1);
    }

    #[test]
    fn schema_change_is_picked_up_once() {
        let (mut provider, mut writer) = live_provider(Arc::new(NullSink));
        writer.publish(&sample(1.0, 1)).unwrap();
        provider.advance().unwrap().unwrap();
        let before = provider.schema().unwrap();

        let grown = [
            VariableInfo::scalar("Speed", VariableType::Float32, 0),
            VariableInfo::scalar("Gear", VariableType::Int32, 4),
            VariableInfo::scalar("Rpm", VariableType::Float32, 8),
        ];
        writer.replace_schema(&grown, 12).unwrap();
        let mut bytes = sample(2.0, 2).to_vec();
        bytes.extend_from_slice(&7200.0f32.to_le_bytes());
        writer.publish(&bytes).unwrap();

        let next = provider.advance().unwrap().unwrap();
        assert_eq!(next.value::<f32>("Rpm").unwrap(), 7200.0);
        assert_eq!(before.len(), 2);
        assert_eq!(provider.schema().unwrap().len(), 3);
    }

    #[test]
    fn rejected_schema_keeps_the_previous_snapshot() {
        let sink = Arc::new(RecordingSink::new());
        let (mut provider, mut writer) = live_provider(sink.clone());
        writer.publish(&sample(1.0, 1)).unwrap();
        provider.advance().unwrap().unwrap();

        let retyped = [
            VariableInfo::scalar("Speed", VariableType::Int32, 0),
            VariableInfo::scalar("Gear", VariableType::Int32, 4),
        ];
        writer.replace_schema(&retyped, 12).unwrap();
        writer.publish(&[0u8; 12]).unwrap();

        let err = provider.advance().unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedSchema { .. }));
        assert_eq!(provider.schema().unwrap().buf_len(), 8);
        assert_eq!(sink.count(|e| matches!(e, TelemetryEvent::SchemaRejected { .. })), 1);
        assert!(provider.advance().is_err());
    }

    #[test]
    fn session_updates_follow_the_generation_marker() {
        let sink = Arc::new(RecordingSink::new());
        let (mut provider, mut writer) = live_provider(sink.clone());
        writer.publish(&sample(1.0, 1)).unwrap();
        provider.advance().unwrap().unwrap();
        assert!(provider.session().unwrap().sectors().is_empty());

        writer.publish_session(&split_time_yaml(&[(0, 0.0), (1, 0.4)])).unwrap();
        writer.publish(&sample(2.0, 1)).unwrap();
        provider.advance().unwrap().unwrap();
        let good = provider.session().unwrap();
        assert_eq!(good.sectors().len(), 2);

        writer.publish_session(&split_time_yaml(&[(0, 0.0), (1, 0.4), (2, 0.3)])).unwrap();
        writer.publish(&sample(3.0, 1)).unwrap();
        assert_eq!(provider.advance().unwrap().unwrap().value::<f32>("Speed").unwrap(), 3.0);
        assert!(Arc::ptr_eq(&good, &provider.session().unwrap()));
        assert_eq!(sink.count(|e| matches!(e, TelemetryEvent::SessionRejected { generation: 3, .. })), 1);
    }

    #[test]
    fn restart_resets_tick_order() {
        let (mut provider, mut writer) = live_provider(Arc::new(NullSink));
        writer.publish_with_tick(500, &sample(1.0, 1)).unwrap();
        assert_eq!(provider.advance().unwrap().unwrap().tick, 500);

        writer.restart().unwrap();
        writer.publish_with_tick(2, &sample(2.0, 1)).unwrap();
        assert!(provider.advance().unwrap().is_none());
        let after = provider.advance().unwrap().unwrap();
        assert_eq!(after.tick, 2);
        assert_eq!(after.index, 1);
    }

    #[test]
    fn live_seek_always_fails() {
        let (mut provider, mut writer) = live_provider(Arc::new(NullSink));
        writer.publish(&sample(1.0, 1)).unwrap();
        writer.publish(&sample(2.0, 1)).unwrap();
        provider.advance().unwrap().unwrap();

        let index = provider.sample_index();
        assert!(!provider.seek(0));
        assert_eq!(provider.sample_index(), index);
        assert_eq!(provider.sample_count(), 0);
    }

    #[test]
    fn recorded_cursor_seeks_within_range() {
        let mut provider = recorded_provider(5);
        assert_eq!(provider.sample_count(), 5);
        assert_eq!(provider.advance().unwrap().unwrap().value::<f32>("Speed").unwrap(), 0.0);

        assert!(provider.seek(3));
        assert_eq!(provider.sample_index(), 3);
        let third = provider.advance().unwrap().unwrap();
        assert_eq!((third.index, third.tick), (3, 3));
        assert_eq!(provider.sample_index(), 3);

        assert!(!provider.seek(5));
        assert_eq!(provider.sample_index(), 3);
        assert!(provider.seek(0));
        assert_eq!(provider.advance().unwrap().unwrap().index, 0);
        assert_eq!(provider.session().unwrap().weekend_info.track_name, "spa");
    }

    #[test]
    fn recorded_ticks_going_backwards_keep_record_order() {
        let ticks = [10, 11, 5, 6, 7];
        let capture = CaptureBuilder::new()
            .variable(VariableInfo::scalar("SessionTick", VariableType::Int32, 0))
            .variable(VariableInfo::scalar("Speed", VariableType::Float32, 4))
            .buf_len(8)
            .records(ticks.iter().enumerate().map(|(i, tick)| {
                let mut record = [0u8; 8];
                record[..4].copy_from_slice(&i32::to_le_bytes(*tick));
                record[4..].copy_from_slice(&(i as f32).to_le_bytes());
                record
            }))
            .build()
            .unwrap();
        let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
        provider.bind(Box::new(RecordedSource::new(IbtReader::from_bytes(capture).unwrap()))).unwrap();

        let mut replayed = Vec::new();
        while let Some(sample) = provider.advance().unwrap() {
            replayed.push((sample.index, sample.tick));
        }
        assert_eq!(replayed, vec![(0, 10), (1, 11), (2, 5), (3, 6), (4, 7)]);
        assert!(provider.is_exhausted());
    }

    #[test]
    fn recorded_source_runs_dry() {
        let mut provider = recorded_provider(2);
        assert!(provider.advance().unwrap().is_some());
        assert!(provider.advance().unwrap().is_some());
        assert!(provider.is_exhausted());
        assert!(provider.advance().unwrap().is_none());
        assert_eq!(provider.tick_rate(), Some(60.0));
    }

    #[test]
    fn session_parsing_can_be_disabled() {
        let config = ProviderConfig { parse_session: false, ..ProviderConfig::default() };
        let capture = CaptureBuilder::new()
            .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
            .buf_len(4)
            .session_text("WeekendInfo:\n  TrackName: spa\n")
            .record(&1.0f32.to_le_bytes())
            .build()
            .unwrap();
        let mut provider = SessionDataProvider::new(config, Arc::new(NullSink));
        provider.bind(Box::new(RecordedSource::new(IbtReader::from_bytes(capture).unwrap()))).unwrap();
        assert!(provider.advance().unwrap().is_some());
        assert!(provider.session().is_none());
    }

    #[test]
    fn handles_follow_published_snapshots() {
        let (mut provider, mut writer) = live_provider(Arc::new(NullSink));
        let schema = provider.schema_handle();
        let session = provider.session_handle();
        assert!(schema.load().is_none());

        writer.publish(&sample(1.0, 1)).unwrap();
        provider.advance().unwrap().unwrap();
        assert_eq!(schema.load().unwrap().len(), 2);
        assert!(session.load().is_some());

        provider.close();
        assert!(schema.load().is_none());
        assert!(matches!(provider.value::<f32>("Speed"), Err(TelemetryError::InvalidState { .. })));
    }
}
