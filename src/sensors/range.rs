//! Ultrasonic time-of-flight ranging.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::hardware::EchoSource;
use crate::kernel::alert::{Alert, PriorityBands};
use crate::kernel::channel::{AlertSender, SendOutcome};
use crate::kernel::state::{SharedStateStore, StateDelta};
use crate::kernel::telemetry::{Telemetry, TelemetryEvent};

/// Round-trip microseconds to centimetres: `us / 29.1 / 2`, in integer math.
pub fn echo_to_distance_cm(echo: Duration) -> u32 {
    let micros = echo.as_micros();
    u32::try_from(micros * 10 / 582).unwrap_or(u32::MAX)
}

/// Classification half of ranging: distance in, store update and alert out.
#[derive(Debug, Clone)]
pub struct RangeSensor {
    bands: PriorityBands,
    store: SharedStateStore,
}

impl RangeSensor {
    pub fn new(bands: PriorityBands, store: SharedStateStore) -> Self {
        Self { bands, store }
    }

    /// Publishes the reading, then classifies it. `None` means nothing answered.
    pub fn evaluate(&self, distance_cm: Option<u32>) -> Option<Alert> {
        self.store.apply(StateDelta::Range(distance_cm));
        distance_cm.and_then(|cm| self.bands.obstacle_alert(cm))
    }
}

/// The periodic ranging task.
pub struct RangeTask<E: EchoSource> {
    sensor: RangeSensor,
    echo: E,
    alerts: AlertSender,
    telemetry: Arc<Telemetry>,
    period: Duration,
    echo_timeout: Duration,
}

impl<E: EchoSource> RangeTask<E> {
    pub fn new(
        sensor: RangeSensor,
        echo: E,
        alerts: AlertSender,
        telemetry: Arc<Telemetry>,
        period: Duration,
        echo_timeout: Duration,
    ) -> Self {
        Self {
            sensor,
            echo,
            alerts,
            telemetry,
            period,
            echo_timeout,
        }
    }

    /// One measurement. A missing or late echo reads as "clear ahead".
    pub async fn cycle(&mut self) -> Option<SendOutcome> {
        let distance_cm = match timeout(self.echo_timeout, self.echo.measure_echo()).await {
            Ok(Some(echo)) => Some(echo_to_distance_cm(echo)),
            Ok(None) => None,
            Err(_) => {
                self.telemetry.record(TelemetryEvent::RangeTimeout);
                None
            }
        };
        debug!(?distance_cm, "range");

        let alert = self.sensor.evaluate(distance_cm)?;
        Some(self.alerts.try_send(alert))
    }

    pub async fn run(mut self, cancel: CancellationToken) -> E {
        info!(period_ms = self.period.as_millis() as u64, "Range sensor started");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let _ = self.cycle().await;
        }
        info!("Range sensor stopped");
        self.echo
    }
}
