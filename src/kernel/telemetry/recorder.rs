use std::sync::atomic::{AtomicU64, Ordering};

use super::event::TelemetryEvent;
use super::metrics::{AlertStats, PositionStats, SensingStats, TelemetrySnapshot, VoiceStats};
use crate::kernel::alert::Priority;
use crate::kernel::audio::endpointer::EndpointReason;

/// Lock-free counters shared by every task through an `Arc`.
#[derive(Debug, Default)]
pub struct Telemetry {
    alerts_queued: AtomicU64,
    alerts_dropped: AtomicU64,
    alerts_closed: AtomicU64,
    actuated_high: AtomicU64,
    actuated_medium: AtomicU64,
    actuated_low: AtomicU64,
    range_timeouts: AtomicU64,
    below_floor: AtomicU64,
    sentences_accepted: AtomicU64,
    sentences_rejected: AtomicU64,
    sentence_overflows: AtomicU64,
    triggers_ignored: AtomicU64,
    endpointed_silence: AtomicU64,
    endpointed_buffer_full: AtomicU64,
    endpointed_max_duration: AtomicU64,
    abandoned: AtomicU64,
    response_timeouts: AtomicU64,
    collaborator_failures: AtomicU64,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: TelemetryEvent) {
        let counter = match event {
            TelemetryEvent::AlertQueued(_) => &self.alerts_queued,
            TelemetryEvent::AlertDropped(_) => &self.alerts_dropped,
            TelemetryEvent::AlertClosed(_) => &self.alerts_closed,
            TelemetryEvent::PatternActuated(Priority::High) => &self.actuated_high,
            TelemetryEvent::PatternActuated(Priority::Medium) => &self.actuated_medium,
            TelemetryEvent::PatternActuated(Priority::Low) => &self.actuated_low,
            TelemetryEvent::RangeTimeout => &self.range_timeouts,
            TelemetryEvent::ClassificationBelowFloor => &self.below_floor,
            TelemetryEvent::SentenceAccepted => &self.sentences_accepted,
            TelemetryEvent::SentenceRejected => &self.sentences_rejected,
            TelemetryEvent::SentenceOverflow => &self.sentence_overflows,
            TelemetryEvent::VoiceTriggerIgnored => &self.triggers_ignored,
            TelemetryEvent::VoiceEndpointed(EndpointReason::Silence) => &self.endpointed_silence,
            TelemetryEvent::VoiceEndpointed(EndpointReason::BufferFull) => &self.endpointed_buffer_full,
            TelemetryEvent::VoiceEndpointed(EndpointReason::MaxDuration) => &self.endpointed_max_duration,
            TelemetryEvent::VoiceAbandoned => &self.abandoned,
            TelemetryEvent::VoiceResponseTimeout => &self.response_timeouts,
            TelemetryEvent::CollaboratorFailed(_) => &self.collaborator_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        TelemetrySnapshot {
            alert_stats: AlertStats {
                queued: load(&self.alerts_queued),
                dropped: load(&self.alerts_dropped),
                closed: load(&self.alerts_closed),
                actuated_high: load(&self.actuated_high),
                actuated_medium: load(&self.actuated_medium),
                actuated_low: load(&self.actuated_low),
            },
            sensing_stats: SensingStats {
                range_timeouts: load(&self.range_timeouts),
                below_confidence_floor: load(&self.below_floor),
            },
            position_stats: PositionStats {
                accepted: load(&self.sentences_accepted),
                rejected: load(&self.sentences_rejected),
                overflows: load(&self.sentence_overflows),
            },
            voice_stats: VoiceStats {
                triggers_ignored: load(&self.triggers_ignored),
                endpointed_silence: load(&self.endpointed_silence),
                endpointed_buffer_full: load(&self.endpointed_buffer_full),
                endpointed_max_duration: load(&self.endpointed_max_duration),
                abandoned: load(&self.abandoned),
                response_timeouts: load(&self.response_timeouts),
            },
            collaborator_failures: load(&self.collaborator_failures),
        }
    }
}
