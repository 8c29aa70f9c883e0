//! Microphone to endpointer plumbing.
//!
//! The capture side and the processing side share nothing but a lock-free
//! ring buffer: one producer, one consumer.

pub mod capture;
pub mod processing;

use ringbuf::traits::Split;
use ringbuf::{HeapCons, HeapProd, HeapRb};

pub use capture::MicrophoneFeed;
pub use processing::VoiceProcessor;

/// Allocates the sample ring shared by capture and processing.
pub fn sample_ring(capacity: usize) -> (HeapProd<i16>, HeapCons<i16>) {
    HeapRb::<i16>::new(capacity.max(1)).split()
}
