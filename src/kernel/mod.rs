//! The decision core: alerts, arbitration, shared state, the voice state
//! machine and write-only telemetry. Nothing in here touches I/O directly.

pub mod alert;
pub mod arbiter;
pub mod audio;
pub mod channel;
pub mod navigation;
pub mod pattern;
pub mod state;
pub mod telemetry;
pub mod time;
