use std::time::Duration;

use ringbuf::traits::Producer;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::hardware::Microphone;

/// Moves microphone reads into the sample ring.
///
/// Lossy: when processing falls behind and the ring is full, the newest
/// samples are dropped rather than blocking the microphone.
pub struct MicrophoneFeed<M, P>
where
    M: Microphone,
    P: Producer<Item = i16> + Send,
{
    microphone: M,
    producer: P,
    chunk: Vec<i16>,
    period: Duration,
}

impl<M, P> MicrophoneFeed<M, P>
where
    M: Microphone,
    P: Producer<Item = i16> + Send,
{
    /// Reads `chunk_samples` every `period`.
    pub fn new(microphone: M, producer: P, chunk_samples: usize, period: Duration) -> Self {
        Self {
            microphone,
            producer,
            chunk: vec![0; chunk_samples.max(1)],
            period,
        }
    }

    /// One read. Returns how many samples reached the ring.
    pub fn pump(&mut self) -> usize {
        let read = self.microphone.read(&mut self.chunk);
        let pushed = self.producer.push_slice(&self.chunk[..read]);
        if pushed < read {
            debug!(dropped = read - pushed, "sample ring full");
        }
        pushed
    }

    pub async fn run(mut self, cancel: CancellationToken) -> M {
        info!(
            chunk = self.chunk.len(),
            period_ms = self.period.as_millis() as u64,
            "Microphone feed started"
        );
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.pump();
        }
        info!("Microphone feed stopped");
        self.microphone
    }
}
