use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::adapter::VisionResultAdapter;
use super::Classifier;
use crate::hardware::FrameSource;
use crate::kernel::channel::AlertSender;

/// Periodic camera -> classifier -> adapter loop.
pub struct VisionPipeline<F: FrameSource, C: Classifier> {
    camera: F,
    classifier: C,
    adapter: VisionResultAdapter,
    alerts: AlertSender,
    period: Duration,
}

impl<F: FrameSource, C: Classifier> VisionPipeline<F, C> {
    pub fn new(
        camera: F,
        classifier: C,
        adapter: VisionResultAdapter,
        alerts: AlertSender,
        period: Duration,
    ) -> Self {
        Self {
            camera,
            classifier,
            adapter,
            alerts,
            period,
        }
    }

    /// One frame. Returns how many alerts were queued.
    pub fn cycle(&mut self) -> usize {
        // Capture failure degrades to silence: no frame, no new context.
        let Some(frame) = self.camera.capture() else {
            debug!("no camera frame this cycle");
            return 0;
        };

        let mut queued = 0;
        for result in self.classifier.classify(&frame) {
            if let Some(alert) = self.adapter.adapt(&result) {
                if self.alerts.try_send(alert).is_queued() {
                    queued += 1;
                }
            }
        }
        queued
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!(period_ms = self.period.as_millis() as u64, "Vision pipeline started");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.cycle();
        }
        info!("Vision pipeline stopped");
    }
}
