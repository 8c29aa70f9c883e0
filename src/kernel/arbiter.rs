use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::alert::Alert;
use super::channel::AlertReceiver;
use super::pattern::pattern_for;
use super::telemetry::{Telemetry, TelemetryEvent};
use crate::hardware::Actuator;

/// The single consumer of the alert channel.
///
/// Patterns run strictly one after another; the channel is not polled while
/// a pattern plays, so alerts arriving meanwhile wait (or are dropped by the
/// channel when it is full).
pub struct AlertArbiter<A: Actuator> {
    receiver: AlertReceiver,
    actuator: A,
    telemetry: Arc<Telemetry>,
}

impl<A: Actuator> AlertArbiter<A> {
    pub fn new(receiver: AlertReceiver, actuator: A, telemetry: Arc<Telemetry>) -> Self {
        Self {
            receiver,
            actuator,
            telemetry,
        }
    }

    /// Drains the channel until cancelled or every producer is gone.
    pub async fn run(mut self, cancel: CancellationToken) -> A {
        info!("Alert arbiter started");
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                next = self.receiver.receive() => next,
            };
            match next {
                Some(alert) => self.actuate(&alert).await,
                None => break,
            }
        }
        self.quiet();
        info!("Alert arbiter stopped");
        self.actuator
    }

    /// Plays the pattern for one alert to completion.
    pub async fn actuate(&mut self, alert: &Alert) {
        let priority = alert.priority();
        debug!(
            source = ?alert.source(),
            ?priority,
            distance_cm = ?alert.distance_cm(),
            waited_ms = alert.raised_at().elapsed().as_millis() as u64,
            "actuating"
        );
        for step in pattern_for(priority) {
            self.actuator.set_vibration(step.vibrate);
            self.actuator.set_tone(step.tone);
            sleep(step.duration).await;
        }
        self.quiet();
        self.telemetry.record(TelemetryEvent::PatternActuated(priority));
    }

    fn quiet(&mut self) {
        self.actuator.set_vibration(false);
        self.actuator.set_tone(false);
    }
}
