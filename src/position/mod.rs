//! Positioning: serial framing, sentence parsing and the location uplink.

pub mod fix;
pub mod framer;
pub mod sentence;
pub mod tracker;
pub mod uplink;

pub use fix::{Coordinate, GpsFix};
pub use sentence::SentenceError;
pub use tracker::PositionTracker;
pub use uplink::LocationReporter;
