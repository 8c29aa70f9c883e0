use std::sync::Arc;

use tracing::debug;

use super::{Classification, ClassificationResult, LightStatus, PathStatus, SignalLightState};
use crate::kernel::alert::{Alert, Priority, PriorityBands};
use crate::kernel::state::{SharedStateStore, StateDelta};
use crate::kernel::telemetry::{Telemetry, TelemetryEvent};

/// Maps classifier results onto the shared alert shape.
///
/// The store is updated for every result, whatever its confidence; only
/// results at or above the floor can become alerts.
#[derive(Debug, Clone)]
pub struct VisionResultAdapter {
    bands: PriorityBands,
    confidence_floor: u8,
    store: SharedStateStore,
    telemetry: Arc<Telemetry>,
}

impl VisionResultAdapter {
    pub fn new(
        bands: PriorityBands,
        confidence_floor: u8,
        store: SharedStateStore,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            bands,
            confidence_floor,
            store,
            telemetry,
        }
    }

    pub fn adapt(&self, result: &ClassificationResult) -> Option<Alert> {
        self.store.apply(self.delta(result));

        if result.confidence < self.confidence_floor {
            debug!(kind = ?result.kind(), confidence = result.confidence, "below confidence floor");
            self.telemetry.record(TelemetryEvent::ClassificationBelowFloor);
            return None;
        }

        match result.classification {
            Classification::PathDeviation(status) => match status {
                PathStatus::NoPath => Some(Alert::path_deviation(Priority::Medium, true)),
                PathStatus::OffLeft | PathStatus::OffRight => {
                    Some(Alert::path_deviation(Priority::Low, false))
                }
                PathStatus::Centered | PathStatus::Unknown => None,
            },
            Classification::SignalLight {
                status: LightStatus::Red,
                remaining_seconds,
            } => {
                let light = SignalLightState::new(LightStatus::Red, remaining_seconds);
                Some(Alert::signal_light(Priority::Medium, light.remaining_seconds))
            }
            Classification::SignalLight { .. } => None,
            Classification::Obstacle { distance_cm } => {
                distance_cm.and_then(|cm| self.bands.obstacle_alert(cm))
            }
        }
    }

    fn delta(&self, result: &ClassificationResult) -> StateDelta {
        match result.classification {
            Classification::PathDeviation(status) => StateDelta::Path(status),
            Classification::SignalLight {
                status,
                remaining_seconds,
            } => StateDelta::SignalLight(SignalLightState::new(status, remaining_seconds)),
            Classification::Obstacle { distance_cm } => StateDelta::VisionObstacle(distance_cm),
        }
    }
}
