use std::sync::Arc;
use std::time::Duration;

use ringbuf::traits::{Consumer, Observer};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::VoiceConfig;
use crate::dialog::Responder;
use crate::kernel::audio::endpointer::{FrameOutcome, Trigger, TriggerOutcome, VoiceEndpointer};
use crate::kernel::audio::session::{CapturedUtterance, VoiceState};
use crate::kernel::telemetry::{Telemetry, TelemetryEvent};
use crate::kernel::time::SampleClock;

/// Drives the endpointer from the sample ring and hands finished utterances
/// to the responder.
///
/// Only this task touches the endpointer, so at most one session exists at a
/// time. Triggers that arrive while a session is in flight are ignored.
pub struct VoiceProcessor<C>
where
    C: Consumer<Item = i16> + Send,
{
    consumer: C,
    triggers: mpsc::Receiver<Trigger>,
    endpointer: VoiceEndpointer,
    responder: Arc<dyn Responder>,
    telemetry: Arc<Telemetry>,
    clock: SampleClock,
    frame: Vec<i16>,
    poll: Duration,
    response_timeout: Duration,
}

impl<C> VoiceProcessor<C>
where
    C: Consumer<Item = i16> + Send,
{
    pub fn new(
        consumer: C,
        triggers: mpsc::Receiver<Trigger>,
        config: &VoiceConfig,
        responder: Arc<dyn Responder>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        let clock = SampleClock::new(config.sample_rate, config.channels);
        let frame_samples = config.frame_samples.max(1);
        // Poll at half a frame so the ring never holds much more than one
        let poll = Duration::from_millis((clock.span_ms(frame_samples) / 2).max(1));
        Self {
            consumer,
            triggers,
            endpointer: VoiceEndpointer::new(config),
            responder,
            telemetry,
            clock,
            frame: vec![0; frame_samples],
            poll,
            response_timeout: config.response_timeout(),
        }
    }

    pub fn state(&self) -> VoiceState {
        self.endpointer.state()
    }

    pub fn trigger(&mut self, trigger: Trigger) -> TriggerOutcome {
        let outcome = self.endpointer.trigger(trigger);
        match outcome {
            TriggerOutcome::Armed => info!(?trigger, "Listening"),
            TriggerOutcome::Busy => {
                debug!(?trigger, state = ?self.endpointer.state(), "trigger ignored");
                self.telemetry.record(TelemetryEvent::VoiceTriggerIgnored);
            }
            TriggerOutcome::BelowThreshold => {}
        }
        outcome
    }

    /// Pops and feeds one full frame if the ring holds one.
    pub fn step(&mut self) -> Option<FrameOutcome> {
        if self.consumer.occupied_len() < self.frame.len() {
            return None;
        }
        let popped = self.consumer.pop_slice(&mut self.frame);
        self.clock.advance(popped);
        let outcome = self
            .endpointer
            .push_frame(&self.frame[..popped], self.clock.now_ms());

        match &outcome {
            FrameOutcome::Abandoned(reason) => {
                debug!(?reason, "no speech, back to idle");
                self.telemetry.record(TelemetryEvent::VoiceAbandoned);
            }
            FrameOutcome::Utterance(utterance) => {
                self.telemetry
                    .record(TelemetryEvent::VoiceEndpointed(utterance.reason));
            }
            _ => {}
        }
        Some(outcome)
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!(frame = self.frame.len(), "Voice processor started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(trigger) = self.triggers.recv() => {
                    self.trigger(trigger);
                }
                _ = sleep(self.poll) => {}
            }

            while let Some(outcome) = self.step() {
                if let FrameOutcome::Utterance(utterance) = outcome {
                    if !self.respond(utterance, &cancel).await {
                        info!("Voice processor stopped");
                        return;
                    }
                }
            }
        }
        info!("Voice processor stopped");
    }

    /// Waits for the reply, bounded by the response timeout. Returns false
    /// when cancelled.
    async fn respond(&mut self, utterance: CapturedUtterance, cancel: &CancellationToken) -> bool {
        let responder = Arc::clone(&self.responder);
        let reply = timeout(self.response_timeout, responder.respond(utterance));
        tokio::pin!(reply);

        let result = loop {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                result = &mut reply => break result,
                Some(trigger) = self.triggers.recv() => {
                    self.trigger(trigger);
                }
            }
        };

        match result {
            Ok(outcome) => {
                debug!(?outcome, "reply delivered");
                if self.endpointer.complete() == VoiceState::Armed {
                    debug!("continuing conversation");
                }
            }
            Err(_) => {
                warn!(timeout_ms = self.response_timeout.as_millis() as u64, "reply timed out");
                self.endpointer.expire();
                self.telemetry.record(TelemetryEvent::VoiceResponseTimeout);
            }
        }

        self.discard_stale_audio();
        true
    }

    /// Audio buffered while waiting is the device's own reply, not the user.
    fn discard_stale_audio(&mut self) {
        let stale = self.consumer.occupied_len();
        let skipped = self.consumer.skip(stale);
        self.clock.advance(skipped);
        if skipped > 0 {
            debug!(samples = skipped, "discarded audio buffered during reply");
        }
    }
}
