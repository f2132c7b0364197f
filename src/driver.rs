//! Driver runs a provider on a tokio task and publishes what it reads.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::provider::{Sample, SessionDataProvider};
use crate::session::SessionDescription;

/// Consecutive non-retryable failures before the driver gives up.
const MAX_ERRORS: u32 = 10;
const MAX_BACKOFF: Duration = Duration::from_millis(1600);

/// Receivers for everything a running [`Driver`] publishes.
pub struct DriverChannels {
    /// Latest sample; `None` before the first one and after the stream ends.
    pub samples: watch::Receiver<Option<Sample>>,
    /// Latest session description.
    pub sessions: watch::Receiver<Option<Arc<SessionDescription>>>,
    /// Cancel to stop the driver.
    pub cancel: CancellationToken,
    /// Completes when the driver stops, handing the provider back.
    pub task: JoinHandle<SessionDataProvider>,
}

impl DriverChannels {
    /// Samples as a stream, starting with the current value.
    pub fn samples(&self) -> WatchStream<Option<Sample>> {
        WatchStream::new(self.samples.clone())
    }

    pub fn sessions(&self) -> WatchStream<Option<Arc<SessionDescription>>> {
        WatchStream::new(self.sessions.clone())
    }
}

/// Polls a [`SessionDataProvider`] on a fixed interval.
///
/// Retryable failures (source unavailable, torn reads) back off
/// exponentially up to a bound and never stop the driver; other failures
/// stop it after [`MAX_ERRORS`] in a row. A recorded source stops it once
/// exhausted.
pub struct Driver;

impl Driver {
    /// Spawn the polling task. Must be called inside a tokio runtime.
    pub fn spawn(provider: SessionDataProvider, interval: Duration) -> DriverChannels {
        let (sample_tx, sample_rx) = watch::channel(None);
        let (session_tx, session_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(Self::poll_task(
            provider,
            interval,
            sample_tx,
            session_tx,
            cancel.clone(),
        ));

        DriverChannels { samples: sample_rx, sessions: session_rx, cancel, task }
    }

    async fn poll_task(
        mut provider: SessionDataProvider,
        interval: Duration,
        sample_tx: watch::Sender<Option<Sample>>,
        session_tx: watch::Sender<Option<Arc<SessionDescription>>>,
        cancel: CancellationToken,
    ) -> SessionDataProvider {
        let interval = interval.max(Duration::from_millis(1));
        info!(interval_ms = interval.as_millis() as u64, "driver started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut published = 0u64;
        let mut failures = 0u32;
        let mut retries = 0u32;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("driver cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            match provider.advance() {
                Ok(Some(sample)) => {
                    failures = 0;
                    retries = 0;
                    published += 1;
                    trace!(index = sample.index, tick = sample.tick, "publishing sample");

                    let session = provider.session();
                    session_tx.send_if_modified(|current| {
                        let changed = match (current.as_ref(), session.as_ref()) {
                            (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
                            (None, None) => false,
                            _ => true,
                        };
                        if changed {
                            *current = session.clone();
                        }
                        changed
                    });

                    if sample_tx.send(Some(sample)).is_err() {
                        debug!("sample receiver dropped, stopping");
                        break;
                    }
                }
                Ok(None) if provider.is_exhausted() => {
                    info!(published, "recorded source exhausted");
                    break;
                }
                Ok(None) => {}
                Err(err) if err.is_retryable() => {
                    retries = retries.saturating_add(1);
                    let backoff = (interval * 2u32.saturating_pow(retries.min(8))).min(MAX_BACKOFF);
                    debug!(error = %err, backoff_ms = backoff.as_millis() as u64, "retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
                Err(err) => {
                    failures += 1;
                    warn!(error = %err, failures, "provider error");
                    if failures >= MAX_ERRORS {
                        error!(error = %err, "too many provider errors, stopping");
                        break;
                    }
                }
            }
        }

        let _ = sample_tx.send(None);
        info!(published, "driver stopped");
        provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibt::{CaptureBuilder, IbtReader};
    use crate::observe::NullSink;
    use crate::provider::RecordedSource;
    use crate::test_utils::unavailable_opener;
    use crate::{ProviderConfig, VariableInfo, VariableType};
    use futures::StreamExt;

    fn recorded(records: usize) -> SessionDataProvider {
        let capture = CaptureBuilder::new()
            .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
            .buf_len(4)
            .session_text("WeekendInfo:\n  TrackName: monza\n")
            .records((0..records).map(|i| (i as f32).to_le_bytes()))
            .build()
            .unwrap();
        let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
        provider
            .bind(Box::new(RecordedSource::new(IbtReader::from_bytes(capture).unwrap())))
            .unwrap();
        provider
    }

    #[tokio::test]
    async fn replays_a_capture_to_the_end() {
        let channels = Driver::spawn(recorded(3), Duration::from_millis(1));
        let mut sessions = channels.sessions.clone();

        let provider = channels.task.await.unwrap();
        assert!(provider.is_exhausted());
        assert_eq!(provider.sample_index(), 2);
        assert!(channels.samples.borrow().is_none());

        let session = sessions.borrow_and_update().clone().unwrap();
        assert_eq!(session.weekend_info.track_name, "monza");
    }

    #[tokio::test]
    async fn stream_yields_published_samples() {
        let channels = Driver::spawn(recorded(50), Duration::from_millis(1));
        let speeds: Vec<f32> = channels
            .samples()
            .filter_map(|sample| async move { sample })
            .take(2)
            .map(|sample| sample.value::<f32>("Speed").unwrap())
            .collect()
            .await;
        assert_eq!(speeds.len(), 2);
        assert!(speeds[0] < speeds[1]);
        channels.cancel.cancel();
        channels.task.await.unwrap();
    }

    #[tokio::test]
    async fn unavailable_source_keeps_retrying_until_cancelled() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
        provider.bind_live(unavailable_opener()).unwrap();

        let channels = Driver::spawn(provider, Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!channels.task.is_finished());

        channels.cancel.cancel();
        let provider = channels.task.await.unwrap();
        assert!(channels.samples.borrow().is_none());
        assert_eq!(provider.sample_count(), 0);
    }
}
