use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// What raised the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSource {
    Obstacle,
    PathDeviation,
    SignalLight,
    Navigation,
}

/// Urgency of an alert. Fully determines the actuation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Source-specific payload carried alongside an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertExtra {
    /// Countdown of a signal light, in seconds
    RemainingSeconds(u32),
    /// The classifier saw no tactile path at all
    NoPathDetected,
}

/// A single actuation request.
///
/// Constructors enforce that only obstacle alerts carry a distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    source: AlertSource,
    priority: Priority,
    distance_cm: Option<u32>,
    extra: Option<AlertExtra>,
    raised_at: Instant,
}

impl Alert {
    pub fn obstacle(priority: Priority, distance_cm: u32) -> Self {
        Self::build(AlertSource::Obstacle, priority, Some(distance_cm), None)
    }

    pub fn path_deviation(priority: Priority, no_path: bool) -> Self {
        let extra = no_path.then_some(AlertExtra::NoPathDetected);
        Self::build(AlertSource::PathDeviation, priority, None, extra)
    }

    pub fn signal_light(priority: Priority, remaining_seconds: u32) -> Self {
        Self::build(
            AlertSource::SignalLight,
            priority,
            None,
            Some(AlertExtra::RemainingSeconds(remaining_seconds)),
        )
    }

    pub fn navigation(priority: Priority) -> Self {
        Self::build(AlertSource::Navigation, priority, None, None)
    }

    fn build(
        source: AlertSource,
        priority: Priority,
        distance_cm: Option<u32>,
        extra: Option<AlertExtra>,
    ) -> Self {
        Self {
            source,
            priority,
            distance_cm,
            extra,
            raised_at: Instant::now(),
        }
    }

    pub fn source(&self) -> AlertSource {
        self.source
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn distance_cm(&self) -> Option<u32> {
        self.distance_cm
    }

    pub fn extra(&self) -> Option<AlertExtra> {
        self.extra
    }

    pub fn raised_at(&self) -> Instant {
        self.raised_at
    }
}

/// Distance buckets shared by the range sensor and vision obstacles.
///
/// Each bound is exclusive: a reading equal to `high_below_cm` is Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBands {
    pub high_below_cm: u32,
    pub medium_below_cm: u32,
    pub low_below_cm: u32,
}

impl Default for PriorityBands {
    fn default() -> Self {
        Self {
            high_below_cm: 30,
            medium_below_cm: 60,
            low_below_cm: 100,
        }
    }
}

impl PriorityBands {
    /// Returns None when the obstacle is far enough to ignore.
    pub fn classify(&self, distance_cm: u32) -> Option<Priority> {
        if distance_cm < self.high_below_cm {
            Some(Priority::High)
        } else if distance_cm < self.medium_below_cm {
            Some(Priority::Medium)
        } else if distance_cm < self.low_below_cm {
            Some(Priority::Low)
        } else {
            None
        }
    }

    pub fn obstacle_alert(&self, distance_cm: u32) -> Option<Alert> {
        self.classify(distance_cm)
            .map(|priority| Alert::obstacle(priority, distance_cm))
    }
}
