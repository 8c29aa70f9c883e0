//! Simulated devices for the desktop binary and the test suite.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::info;

use super::{Actuator, EchoSource, FrameSource, Microphone};
use crate::vision::{ClassificationResult, Classifier};

/// Output line change seen by a `RecordingActuator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorEvent {
    pub at: Instant,
    pub vibration: bool,
    pub tone: bool,
}

/// Records every line change; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    vibration: bool,
    tone: bool,
    log: Arc<Mutex<Vec<ActuatorEvent>>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ActuatorEvent> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rising edges of the vibration line.
    pub fn vibration_bursts(&self) -> usize {
        let mut previous = false;
        let mut bursts = 0;
        for event in self.events() {
            if event.vibration && !previous {
                bursts += 1;
            }
            previous = event.vibration;
        }
        bursts
    }

    /// Rising edges of the buzzer line.
    pub fn tone_bursts(&self) -> usize {
        let mut previous = false;
        let mut bursts = 0;
        for event in self.events() {
            if event.tone && !previous {
                bursts += 1;
            }
            previous = event.tone;
        }
        bursts
    }

    fn push(&self) {
        let event = ActuatorEvent {
            at: Instant::now(),
            vibration: self.vibration,
            tone: self.tone,
        };
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Actuator for RecordingActuator {
    fn set_vibration(&mut self, on: bool) {
        if self.vibration != on {
            self.vibration = on;
            self.push();
        }
    }

    fn set_tone(&mut self, on: bool) {
        if self.tone != on {
            self.tone = on;
            self.push();
        }
    }
}

/// Logs line changes instead of driving pins.
#[derive(Debug, Default)]
pub struct LoggingActuator {
    vibration: bool,
    tone: bool,
}

impl Actuator for LoggingActuator {
    fn set_vibration(&mut self, on: bool) {
        if self.vibration != on {
            self.vibration = on;
            info!(on, "vibration");
        }
    }

    fn set_tone(&mut self, on: bool) {
        if self.tone != on {
            self.tone = on;
            info!(on, "buzzer");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoScript {
    /// Echo line stayed high this long
    Echo(Duration),
    /// Sensor reported no echo
    Nothing,
    /// Edge never arrives
    Hang,
}

/// Replays a script of echo results, repeating the last entry forever.
#[derive(Debug, Clone)]
pub struct ScriptedEcho {
    script: VecDeque<EchoScript>,
    last: EchoScript,
}

impl ScriptedEcho {
    pub fn new(script: impl IntoIterator<Item = EchoScript>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: EchoScript::Nothing,
        }
    }

    /// Echo that corresponds to an obstacle `distance_cm` away.
    pub fn at_distance(distance_cm: u32) -> EchoScript {
        let micros = (u64::from(distance_cm) * 582).div_ceil(10);
        EchoScript::Echo(Duration::from_micros(micros))
    }
}

#[async_trait]
impl EchoSource for ScriptedEcho {
    async fn measure_echo(&mut self) -> Option<Duration> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        match self.last {
            EchoScript::Echo(duration) => Some(duration),
            EchoScript::Nothing => None,
            EchoScript::Hang => std::future::pending().await,
        }
    }
}

/// Camera that always returns a blank frame.
#[derive(Debug, Clone)]
pub struct BlankCamera {
    pub frame_len: usize,
}

impl FrameSource for BlankCamera {
    fn capture(&mut self) -> Option<Vec<u8>> {
        Some(vec![0; self.frame_len])
    }
}

/// Hands out queued classifier results, one batch per frame.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClassifier {
    batches: VecDeque<Vec<ClassificationResult>>,
}

impl ScriptedClassifier {
    pub fn new(batches: impl IntoIterator<Item = Vec<ClassificationResult>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&mut self, _frame: &[u8]) -> Vec<ClassificationResult> {
        self.batches.pop_front().unwrap_or_default()
    }
}

/// Produces constant-amplitude segments, then silence forever.
#[derive(Debug, Clone, Default)]
pub struct SyntheticMicrophone {
    segments: VecDeque<(i16, usize)>,
}

impl SyntheticMicrophone {
    /// `segments` are (amplitude, sample count) pairs played in order.
    pub fn new(segments: impl IntoIterator<Item = (i16, usize)>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }
}

impl Microphone for SyntheticMicrophone {
    fn read(&mut self, buf: &mut [i16]) -> usize {
        let mut written = 0;
        while written < buf.len() {
            let Some((amplitude, remaining)) = self.segments.front_mut() else {
                buf[written..].fill(0);
                return buf.len();
            };
            let take = (*remaining).min(buf.len() - written);
            // Alternate sign so the signal has no DC offset
            for (i, sample) in buf[written..written + take].iter_mut().enumerate() {
                *sample = if i % 2 == 0 { *amplitude } else { -*amplitude };
            }
            written += take;
            *remaining -= take;
            if *remaining == 0 {
                self.segments.pop_front();
            }
        }
        written
    }
}
