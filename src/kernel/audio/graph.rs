use super::session::VoiceState;

/// Requests for a voice state transition. These are REQUESTS; the graph
/// decides whether they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceRequest {
    /// Button edge or a wake word above threshold
    Trigger,
    FrameArrived,
    /// Silence ceiling, full buffer or the absolute duration ceiling
    TerminationRuleFired,
    /// Too few voiced frames: noise, not speech
    Abandon,
    HandOff,
    ReplyDelivered,
    ResponseTimedOut,
    /// Reply played and the conversation continues without a new wake
    FollowUp,
    Cancel,
}

/// The state machine that governs voice capture.
pub struct VoiceGraph;

impl VoiceGraph {
    /// Pure function: (Current State, Request) -> New State
    /// Returns None if the transition is invalid/ignored.
    pub fn transition(current: VoiceState, request: VoiceRequest) -> Option<VoiceState> {
        use VoiceRequest::*;
        use VoiceState::*;

        match (current, request) {
            (Idle, Trigger) => Some(Armed),

            (Armed, FrameArrived) => Some(Recording),
            (Recording, FrameArrived) => Some(Recording),
            (Recording, TerminationRuleFired) => Some(Endpointed),

            (Endpointed, Abandon) => Some(Idle),
            (Endpointed, HandOff) => Some(Processing),

            (Processing, ReplyDelivered) => Some(Idle),
            (Processing, ResponseTimedOut) => Some(Idle),
            (Processing, FollowUp) => Some(Armed),

            (Armed | Recording | Endpointed | Processing, Cancel) => Some(Idle),

            // Double-arm and every other out-of-order request
            _ => None,
        }
    }
}
