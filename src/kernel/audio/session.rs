use serde::{Deserialize, Serialize};

use super::endpointer::EndpointReason;

/// Lifecycle of one capture-and-respond cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoiceState {
    /// Waiting for a button edge or a wake word.
    #[default]
    Idle,
    /// Triggered; the next frame starts capture.
    Armed,
    /// Buffering frames and watching their energy.
    Recording,
    /// A termination rule fired; deciding between abandon and hand-off.
    Endpointed,
    /// Utterance handed to transcription, waiting for a reply or timeout.
    Processing,
}

/// Buffered audio and counters for the session currently recording.
///
/// The sample buffer is allocated once per session at full capacity and
/// never grows past it.
#[derive(Debug, Clone)]
pub struct VoiceSession {
    samples: Vec<i16>,
    capacity: usize,
    start_ms: u64,
    last_frame_ms: u64,
    silence_accum_ms: u64,
    voiced_frame_count: u32,
}

impl VoiceSession {
    /// Opens a session at `start_ms`, the stream time where its first frame begins.
    pub fn begin(start_ms: u64, capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            start_ms,
            last_frame_ms: start_ms,
            silence_accum_ms: 0,
            voiced_frame_count: 0,
        }
    }

    /// Copies as much of `frame` as still fits. Returns the number of samples kept.
    pub fn append(&mut self, frame: &[i16]) -> usize {
        let room = self.capacity - self.samples.len();
        let take = room.min(frame.len());
        self.samples.extend_from_slice(&frame[..take]);
        take
    }

    /// Applies the per-frame energy rule. `now_ms` is where the frame ends,
    /// so each frame contributes its own duration.
    pub fn observe(&mut self, silent: bool, now_ms: u64) {
        let since_previous = now_ms.saturating_sub(self.last_frame_ms);
        self.last_frame_ms = now_ms;
        if silent {
            self.silence_accum_ms += since_previous;
        } else {
            self.silence_accum_ms = 0;
            self.voiced_frame_count += 1;
        }
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn recording_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn silence_accum_ms(&self) -> u64 {
        self.silence_accum_ms
    }

    pub fn voiced_frame_count(&self) -> u32 {
        self.voiced_frame_count
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_utterance(
        self,
        reason: EndpointReason,
        sample_rate: u32,
        channels: u16,
    ) -> CapturedUtterance {
        CapturedUtterance {
            duration_ms: self.last_frame_ms - self.start_ms,
            voiced_frames: self.voiced_frame_count,
            samples: self.samples,
            sample_rate,
            channels,
            reason,
        }
    }
}

/// Audio handed to transcription once a session endpoints with enough speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedUtterance {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub reason: EndpointReason,
    /// From the first captured frame to the last observed one
    pub duration_ms: u64,
    pub voiced_frames: u32,
}
