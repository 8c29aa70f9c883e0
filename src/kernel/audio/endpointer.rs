//! Energy-based endpointing for one voice session at a time.
//!
//! The endpointer is a pure decision kernel: callers hand it frames stamped
//! with the monotonic stream time at which each frame ends, and act on the
//! returned outcome. It never sleeps, never reads a clock and never talks to
//! a collaborator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{VoiceGraph, VoiceRequest};
use super::session::{CapturedUtterance, VoiceSession, VoiceState};
use crate::config::VoiceConfig;

/// What armed the endpointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Button,
    WakeWord { confidence: f32 },
}

/// Which termination rule ended a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointReason {
    Silence,
    BufferFull,
    MaxDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Armed,
    /// Wake word confidence at or below the threshold
    BelowThreshold,
    /// A session is already armed, recording or processing
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not armed or recording; the frame is not ours
    Ignored,
    /// This frame opened a recording
    Started,
    Capturing,
    /// Endpointed with too little speech; back to idle
    Abandoned(EndpointReason),
    /// Endpointed with speech; now processing
    Utterance(CapturedUtterance),
}

/// Mean absolute amplitude of a frame. Empty frames are silent.
pub fn mean_abs_amplitude(frame: &[i16]) -> u32 {
    if frame.is_empty() {
        return 0;
    }
    let sum: u64 = frame.iter().map(|&s| u64::from(s.unsigned_abs())).sum();
    (sum / frame.len() as u64) as u32
}

pub struct VoiceEndpointer {
    config: VoiceConfig,
    capacity: usize,
    state: VoiceState,
    session: Option<VoiceSession>,
    samples_per_second: u64,
}

impl VoiceEndpointer {
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            capacity: config.capture_capacity().max(1),
            config: config.clone(),
            state: VoiceState::Idle,
            session: None,
            samples_per_second: (u64::from(config.sample_rate) * u64::from(config.channels)).max(1),
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// The session being recorded, if any.
    pub fn session(&self) -> Option<&VoiceSession> {
        self.session.as_ref()
    }

    pub fn trigger(&mut self, trigger: Trigger) -> TriggerOutcome {
        if let Trigger::WakeWord { confidence } = trigger {
            if confidence <= self.config.wake_word_threshold {
                return TriggerOutcome::BelowThreshold;
            }
        }
        if self.apply(VoiceRequest::Trigger) {
            debug!(?trigger, "voice armed");
            TriggerOutcome::Armed
        } else {
            TriggerOutcome::Busy
        }
    }

    /// Feeds one captured frame that ends at stream time `now_ms`.
    pub fn push_frame(&mut self, frame: &[i16], now_ms: u64) -> FrameOutcome {
        let started = match self.state {
            VoiceState::Armed => {
                let start_ms = now_ms.saturating_sub(self.span_ms(frame.len()));
                self.session = Some(VoiceSession::begin(start_ms, self.capacity));
                true
            }
            VoiceState::Recording => false,
            _ => return FrameOutcome::Ignored,
        };
        self.apply(VoiceRequest::FrameArrived);

        let Some(session) = self.session.as_mut() else {
            return FrameOutcome::Ignored;
        };

        // Absolute ceiling: a frame that would end past it is not captured
        if session.recording_ms(now_ms) > self.config.max_recording_ms {
            return self.endpoint(EndpointReason::MaxDuration);
        }

        session.append(frame);
        let silent = mean_abs_amplitude(frame) < self.config.silence_threshold;
        session.observe(silent, now_ms);

        if session.is_full() {
            return self.endpoint(EndpointReason::BufferFull);
        }
        if session.silence_accum_ms() >= self.config.silence_ceiling_ms {
            return self.endpoint(EndpointReason::Silence);
        }
        if session.recording_ms(now_ms) >= self.config.max_recording_ms {
            return self.endpoint(EndpointReason::MaxDuration);
        }

        if started {
            FrameOutcome::Started
        } else {
            FrameOutcome::Capturing
        }
    }

    /// The reply was delivered. Returns the state the endpointer settled in.
    pub fn complete(&mut self) -> VoiceState {
        let request = if self.config.continue_conversation {
            VoiceRequest::FollowUp
        } else {
            VoiceRequest::ReplyDelivered
        };
        self.apply(request);
        self.state
    }

    /// Gives up waiting for a reply. Returns false when nothing was processing.
    pub fn expire(&mut self) -> bool {
        self.apply(VoiceRequest::ResponseTimedOut)
    }

    /// Drops whatever is in progress.
    pub fn reset(&mut self) {
        self.apply(VoiceRequest::Cancel);
        self.session = None;
    }

    fn span_ms(&self, samples: usize) -> u64 {
        samples as u64 * 1000 / self.samples_per_second
    }

    fn endpoint(&mut self, reason: EndpointReason) -> FrameOutcome {
        self.apply(VoiceRequest::TerminationRuleFired);
        let Some(session) = self.session.take() else {
            self.apply(VoiceRequest::Abandon);
            return FrameOutcome::Abandoned(reason);
        };

        if session.voiced_frame_count() < self.config.min_voiced_frames {
            debug!(
                ?reason,
                voiced = session.voiced_frame_count(),
                "voice session abandoned"
            );
            self.apply(VoiceRequest::Abandon);
            return FrameOutcome::Abandoned(reason);
        }

        self.apply(VoiceRequest::HandOff);
        let utterance = session.into_utterance(reason, self.config.sample_rate, self.config.channels);
        debug!(
            ?reason,
            samples = utterance.samples.len(),
            duration_ms = utterance.duration_ms,
            "voice session endpointed"
        );
        FrameOutcome::Utterance(utterance)
    }

    fn apply(&mut self, request: VoiceRequest) -> bool {
        match VoiceGraph::transition(self.state, request) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }
}
