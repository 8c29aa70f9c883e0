use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::kernel::state::SharedStateStore;
use crate::kernel::telemetry::{Service, Telemetry, TelemetryEvent};
use crate::services::{LocationUplink, NetworkStatus};

/// Periodically uploads the last valid position while the network is up.
pub struct LocationReporter {
    store: SharedStateStore,
    network: NetworkStatus,
    uplink: Arc<dyn LocationUplink>,
    telemetry: Arc<Telemetry>,
    period: Duration,
    request_timeout: Duration,
}

/// What one reporting cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Sent,
    Offline,
    NoPosition,
    Failed,
}

impl LocationReporter {
    pub fn new(
        store: SharedStateStore,
        network: NetworkStatus,
        uplink: Arc<dyn LocationUplink>,
        telemetry: Arc<Telemetry>,
        period: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            network,
            uplink,
            telemetry,
            period,
            request_timeout,
        }
    }

    pub async fn report_once(&self) -> ReportOutcome {
        if !self.network.is_available() {
            return ReportOutcome::Offline;
        }
        let Some(position) = self.store.last_known_position() else {
            return ReportOutcome::NoPosition;
        };
        match timeout(self.request_timeout, self.uplink.report(position)).await {
            Ok(Ok(())) => {
                debug!("position reported");
                ReportOutcome::Sent
            }
            Ok(Err(e)) => {
                warn!(error = %e, "position report failed");
                self.telemetry
                    .record(TelemetryEvent::CollaboratorFailed(Service::LocationUplink));
                ReportOutcome::Failed
            }
            Err(_) => {
                warn!("position report timed out");
                self.telemetry
                    .record(TelemetryEvent::CollaboratorFailed(Service::LocationUplink));
                ReportOutcome::Failed
            }
        }
    }

    pub async fn run(self, cancel: CancellationToken) {
        info!(period_ms = self.period.as_millis() as u64, "Location reporter started");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.report_once() => {}
            }
        }
        info!("Location reporter stopped");
    }
}
