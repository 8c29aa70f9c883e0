use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::fix::GpsFix;
use super::framer::{FramerEvent, SentenceFramer};
use super::sentence;
use crate::kernel::state::{SharedStateStore, StateDelta};
use crate::kernel::telemetry::{Telemetry, TelemetryEvent};

const READ_RETRY: Duration = Duration::from_millis(100);

/// Turns the receiver's serial byte stream into fixes in the state store.
///
/// Every failure is local: a bad sentence is logged and dropped, the stored
/// fix stays untouched and the next sentence is parsed as usual.
pub struct PositionTracker {
    framer: SentenceFramer,
    store: SharedStateStore,
    telemetry: Arc<Telemetry>,
}

impl PositionTracker {
    pub fn new(buffer_capacity: usize, store: SharedStateStore, telemetry: Arc<Telemetry>) -> Self {
        Self {
            framer: SentenceFramer::new(buffer_capacity),
            store,
            telemetry,
        }
    }

    /// Feeds raw bytes. Returns the fixes stored as a result.
    pub fn ingest(&mut self, bytes: &[u8]) -> Vec<GpsFix> {
        let mut stored = Vec::new();
        for event in self.framer.feed(bytes) {
            match event {
                FramerEvent::Sentence(text) => match sentence::parse(&text) {
                    Ok(fix) => {
                        debug!(valid = fix.valid, utc = %fix.utc_time, "position sentence");
                        self.store.apply(StateDelta::Fix(fix.clone()));
                        self.telemetry.record(TelemetryEvent::SentenceAccepted);
                        stored.push(fix);
                    }
                    Err(e) => {
                        warn!(error = %e, "discarding position sentence");
                        self.telemetry.record(TelemetryEvent::SentenceRejected);
                    }
                },
                FramerEvent::Unrecognized => {}
                FramerEvent::Overflow => {
                    debug!("position buffer full, cleared");
                    self.telemetry.record(TelemetryEvent::SentenceOverflow);
                }
            }
        }
        stored
    }

    /// Reads `serial` until EOF or cancellation. Read errors are retried.
    pub async fn run<R>(mut self, mut serial: R, cancel: CancellationToken)
    where
        R: AsyncRead + Unpin + Send,
    {
        info!("Position tracker started");
        let mut chunk = [0u8; 128];
        loop {
            let read = tokio::select! {
                _ = cancel.cancelled() => break,
                read = serial.read(&mut chunk) => read,
            };
            match read {
                Ok(0) => {
                    info!("Position stream closed");
                    break;
                }
                Ok(n) => {
                    self.ingest(&chunk[..n]);
                }
                Err(e) => {
                    warn!(error = %e, "position stream read failed, retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = sleep(READ_RETRY) => {}
                    }
                }
            }
        }
        info!("Position tracker stopped");
    }
}
