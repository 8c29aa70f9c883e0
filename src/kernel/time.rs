/// Stream time derived from samples consumed, not from a wall clock.
///
/// Frames popped in a burst still get evenly spaced timestamps, so the
/// silence rule sees audio time even when the consumer falls behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClock {
    samples: u64,
    samples_per_second: u64,
}

impl SampleClock {
    /// `samples_per_second` counts interleaved samples (rate x channels).
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: 0,
            samples_per_second: (u64::from(sample_rate) * u64::from(channels)).max(1),
        }
    }

    pub fn advance(&mut self, samples: usize) {
        self.samples += samples as u64;
    }

    pub fn now_ms(&self) -> u64 {
        self.samples * 1000 / self.samples_per_second
    }

    /// Milliseconds of audio in `samples`.
    pub fn span_ms(&self, samples: usize) -> u64 {
        samples as u64 * 1000 / self.samples_per_second
    }
}
