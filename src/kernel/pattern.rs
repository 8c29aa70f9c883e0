use std::time::Duration;

use super::alert::Priority;

/// One timed segment of an actuation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternStep {
    pub vibrate: bool,
    pub tone: bool,
    pub duration: Duration,
}

impl PatternStep {
    const fn on(vibrate: bool, tone: bool, ms: u64) -> Self {
        Self {
            vibrate,
            tone,
            duration: Duration::from_millis(ms),
        }
    }

    const fn off(ms: u64) -> Self {
        Self::on(false, false, ms)
    }

    pub fn is_active(&self) -> bool {
        self.vibrate || self.tone
    }
}

const HIGH: [PatternStep; 4] = [
    PatternStep::on(true, true, 100),
    PatternStep::off(100),
    PatternStep::on(true, true, 100),
    PatternStep::off(100),
];
const MEDIUM: [PatternStep; 1] = [PatternStep::on(true, true, 300)];
const LOW: [PatternStep; 1] = [PatternStep::on(true, false, 200)];

/// Pure projection: Priority -> the haptic/audio sequence the arbiter plays.
pub fn pattern_for(priority: Priority) -> &'static [PatternStep] {
    match priority {
        Priority::High => &HIGH,
        Priority::Medium => &MEDIUM,
        Priority::Low => &LOW,
    }
}

/// Number of distinct on-segments in a pattern.
pub fn bursts(steps: &[PatternStep]) -> usize {
    steps.iter().filter(|s| s.is_active()).count()
}

pub fn total_duration(steps: &[PatternStep]) -> Duration {
    steps.iter().map(|s| s.duration).sum()
}
