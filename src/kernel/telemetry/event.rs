use serde::{Deserialize, Serialize};

use crate::kernel::alert::{AlertSource, Priority};
use crate::kernel::audio::endpointer::EndpointReason;

// Allowed: sources, priorities, reasons, service names
// Forbidden: text, audio frames, coordinates

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    AlertQueued(AlertSource),
    AlertDropped(AlertSource),
    /// Sent after the arbiter went away
    AlertClosed(AlertSource),
    PatternActuated(Priority),

    RangeTimeout,
    ClassificationBelowFloor,

    SentenceAccepted,
    SentenceRejected,
    /// Receive buffer filled without a complete sentence
    SentenceOverflow,

    VoiceTriggerIgnored,
    VoiceEndpointed(EndpointReason),
    VoiceAbandoned,
    VoiceResponseTimeout,

    CollaboratorFailed(Service),
}

/// External collaborators, named for failure accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    Transcription,
    Assistant,
    Speech,
    Geocoding,
    Routing,
    Weather,
    LocationUplink,
}

impl Service {
    pub fn name(self) -> &'static str {
        match self {
            Self::Transcription => "transcription",
            Self::Assistant => "assistant",
            Self::Speech => "speech",
            Self::Geocoding => "geocoding",
            Self::Routing => "routing",
            Self::Weather => "weather",
            Self::LocationUplink => "location uplink",
        }
    }
}
