//! Hardware primitives the core drives or samples.
//!
//! Pin timing, tone generation and I2S setup live behind these traits; the
//! core only decides *when* and *what*.

pub mod sim;

use std::time::Duration;

use async_trait::async_trait;

/// Vibration motor and buzzer.
pub trait Actuator: Send {
    fn set_vibration(&mut self, on: bool);
    fn set_tone(&mut self, on: bool);
}

/// Ultrasonic ranger: fire a trigger pulse, report how long the echo line stayed high.
///
/// Implementations may wait for the edge; callers always bound that wait.
#[async_trait]
pub trait EchoSource: Send {
    async fn measure_echo(&mut self) -> Option<Duration>;
}

/// Camera. `None` means the frame could not be captured this cycle.
pub trait FrameSource: Send {
    fn capture(&mut self) -> Option<Vec<u8>>;
}

/// PCM microphone. Fills `buf` with up to `buf.len()` samples, returns how many.
pub trait Microphone: Send {
    fn read(&mut self, buf: &mut [i16]) -> usize;
}
