//! Camera-side sensing: classifier results in, alerts and state out.
//!
//! Pixel work is the classifier's business. This module only sees typed
//! results and decides what they mean for the user.

pub mod adapter;
pub mod pipeline;

use serde::{Deserialize, Serialize};

pub use adapter::VisionResultAdapter;
pub use pipeline::VisionPipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LightStatus {
    #[default]
    Unknown,
    Red,
    Green,
    Yellow,
}

impl LightStatus {
    /// Countdown assumed when the classifier cannot read one.
    pub fn default_remaining_seconds(self) -> u32 {
        match self {
            LightStatus::Unknown => 0,
            LightStatus::Red => 30,
            LightStatus::Green => 40,
            LightStatus::Yellow => 5,
        }
    }
}

/// Latest traffic-light reading. `remaining_seconds` is 0 while Unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalLightState {
    pub status: LightStatus,
    pub remaining_seconds: u32,
}

impl SignalLightState {
    pub fn new(status: LightStatus, remaining_seconds: Option<u32>) -> Self {
        let remaining_seconds = match status {
            LightStatus::Unknown => 0,
            _ => remaining_seconds.unwrap_or_else(|| status.default_remaining_seconds()),
        };
        Self {
            status,
            remaining_seconds,
        }
    }
}

/// Where the tactile paving is relative to the cane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathStatus {
    #[default]
    Unknown,
    Centered,
    OffLeft,
    OffRight,
    NoPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationKind {
    PathDeviation,
    SignalLight,
    Obstacle,
}

/// What the classifier saw; the variant is the result's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    PathDeviation(PathStatus),
    SignalLight {
        status: LightStatus,
        remaining_seconds: Option<u32>,
    },
    /// `None` when no obstacle is present
    Obstacle { distance_cm: Option<u32> },
}

/// One result from the external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classification: Classification,
    /// Percent, 0..=100
    pub confidence: u8,
}

impl ClassificationResult {
    pub fn new(classification: Classification, confidence: u8) -> Self {
        Self {
            classification,
            confidence: confidence.min(100),
        }
    }

    pub fn path(status: PathStatus, confidence: u8) -> Self {
        Self::new(Classification::PathDeviation(status), confidence)
    }

    pub fn light(status: LightStatus, remaining_seconds: Option<u32>, confidence: u8) -> Self {
        Self::new(
            Classification::SignalLight {
                status,
                remaining_seconds,
            },
            confidence,
        )
    }

    pub fn obstacle(distance_cm: Option<u32>, confidence: u8) -> Self {
        Self::new(Classification::Obstacle { distance_cm }, confidence)
    }

    pub fn kind(&self) -> ClassificationKind {
        match self.classification {
            Classification::PathDeviation(_) => ClassificationKind::PathDeviation,
            Classification::SignalLight { .. } => ClassificationKind::SignalLight,
            Classification::Obstacle { .. } => ClassificationKind::Obstacle,
        }
    }
}

/// Black-box image classifier.
pub trait Classifier: Send {
    fn classify(&mut self, frame: &[u8]) -> Vec<ClassificationResult>;
}
