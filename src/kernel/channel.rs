//! Bounded alert channel: many producers, one consumer.
//!
//! Producers never wait. When the queue is full the alert being sent is
//! dropped and counted; what is already queued keeps its place. Delivery is
//! strictly FIFO across producers, priority only matters to the consumer.
//!
//! Under sustained overload an older, stale alert may be serviced before a
//! newer urgent one. Producers re-raise a persisting condition every cycle,
//! so a dropped alert comes back within one sensing period.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::alert::Alert;
use super::telemetry::{Telemetry, TelemetryEvent};

/// Result of a non-blocking send.
#[derive(Debug)]
#[must_use]
pub enum SendOutcome {
    Queued,
    /// Channel full; the alert handed back was not queued
    Dropped(Alert),
    /// The consumer is gone
    Closed(Alert),
}

impl SendOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued)
    }
}

/// Producer half. Cheap to clone, one per sensing task.
#[derive(Clone)]
pub struct AlertSender {
    tx: mpsc::Sender<Alert>,
    telemetry: Arc<Telemetry>,
}

/// Consumer half. Exactly one exists per channel.
pub struct AlertReceiver {
    rx: mpsc::Receiver<Alert>,
}

pub fn alert_channel(capacity: usize, telemetry: Arc<Telemetry>) -> (AlertSender, AlertReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (AlertSender { tx, telemetry }, AlertReceiver { rx })
}

impl AlertSender {
    pub fn try_send(&self, alert: Alert) -> SendOutcome {
        let source = alert.source();
        match self.tx.try_send(alert) {
            Ok(()) => {
                self.telemetry.record(TelemetryEvent::AlertQueued(source));
                debug!(?source, queued = self.queued(), "alert queued");
                SendOutcome::Queued
            }
            Err(TrySendError::Full(alert)) => {
                self.telemetry.record(TelemetryEvent::AlertDropped(source));
                warn!(?source, priority = ?alert.priority(), "alert channel full, dropping alert");
                SendOutcome::Dropped(alert)
            }
            Err(TrySendError::Closed(alert)) => {
                self.telemetry.record(TelemetryEvent::AlertClosed(source));
                debug!(?source, "alert channel closed, alert not delivered");
                SendOutcome::Closed(alert)
            }
        }
    }

    /// Alerts currently waiting for the consumer.
    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

impl AlertReceiver {
    /// Waits for the next alert. None once every sender is gone.
    pub async fn receive(&mut self) -> Option<Alert> {
        self.rx.recv().await
    }

    pub fn try_receive(&mut self) -> Option<Alert> {
        self.rx.try_recv().ok()
    }

    pub fn queued(&self) -> usize {
        self.rx.len()
    }
}
