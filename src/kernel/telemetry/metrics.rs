/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub alert_stats: AlertStats,
    pub sensing_stats: SensingStats,
    pub position_stats: PositionStats,
    pub voice_stats: VoiceStats,
    pub collaborator_failures: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertStats {
    pub queued: u64,
    pub dropped: u64,
    pub closed: u64,
    pub actuated_high: u64,
    pub actuated_medium: u64,
    pub actuated_low: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensingStats {
    pub range_timeouts: u64,
    pub below_confidence_floor: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionStats {
    pub accepted: u64,
    pub rejected: u64,
    pub overflows: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceStats {
    pub triggers_ignored: u64,
    pub endpointed_silence: u64,
    pub endpointed_buffer_full: u64,
    pub endpointed_max_duration: u64,
    pub abandoned: u64,
    pub response_timeouts: u64,
}

impl AlertStats {
    pub fn actuated(&self) -> u64 {
        self.actuated_high + self.actuated_medium + self.actuated_low
    }

    /// Share of send attempts that were dropped, 0.0 when nothing was sent.
    pub fn drop_ratio(&self) -> f64 {
        let attempts = self.queued + self.dropped;
        if attempts == 0 {
            0.0
        } else {
            self.dropped as f64 / attempts as f64
        }
    }
}

impl VoiceStats {
    pub fn endpointed(&self) -> u64 {
        self.endpointed_silence + self.endpointed_buffer_full + self.endpointed_max_duration
    }
}
