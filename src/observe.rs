//! Observability hooks for the read and publish paths.
//!
//! The reader and provider never log on their own behalf through a global
//! subscriber; they report [`TelemetryEvent`]s to an injected
//! [`TelemetrySink`]. [`TracingSink`] forwards events to `tracing`,
//! [`NullSink`] drops them and [`RecordingSink`] keeps them for inspection.
//! Events carry no borrowed data, and the ones raised on the read path do not
//! allocate.

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::schema::SchemaFingerprint;

/// Something worth reporting on the ingestion path.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// A sample copy was overwritten mid-read and discarded.
    TornRead { attempt: u32, slot: usize },
    /// Slot ticks went backwards; the writer restarted.
    WriterRestarted { last_tick: i32, tick: i32 },
    /// The writer's variable-header generation changed.
    SchemaChanged { from: SchemaFingerprint, to: SchemaFingerprint },
    SchemaPublished { variables: usize },
    /// A decoded schema was refused; the previous one stays in effect.
    SchemaRejected { reason: String },
    SessionPublished { generation: i32 },
    /// A session description failed to parse; the previous one stays in effect.
    SessionRejected { generation: i32, reason: String },
    SourceUnavailable { reason: String },
    StateChanged { from: &'static str, to: &'static str },
}

/// Receiver for [`TelemetryEvent`]s.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::TornRead { attempt, slot } => trace!(attempt, slot, "torn read"),
            TelemetryEvent::WriterRestarted { last_tick, tick } => {
                debug!(last_tick, tick, "writer restarted")
            }
            TelemetryEvent::SchemaChanged { from, to } => {
                debug!(from = %from, to = %to, "schema generation changed")
            }
            TelemetryEvent::SchemaPublished { variables } => debug!(variables, "schema published"),
            TelemetryEvent::SchemaRejected { reason } => warn!(%reason, "schema rejected"),
            TelemetryEvent::SessionPublished { generation } => {
                debug!(generation, "session description published")
            }
            TelemetryEvent::SessionRejected { generation, reason } => {
                warn!(generation, %reason, "session description rejected")
            }
            TelemetryEvent::SourceUnavailable { reason } => debug!(%reason, "source unavailable"),
            TelemetryEvent::StateChanged { from, to } => debug!(from, to, "provider state changed"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&TelemetryEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl TelemetrySink for RecordingSink {
    fn record(&self, event: TelemetryEvent) {
        self.events.lock().push(event);
    }
}
