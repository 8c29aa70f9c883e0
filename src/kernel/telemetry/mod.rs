//! Device counters
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side-effect layer.
//! It must **NEVER** be read inside decision logic (sensors, arbiter, endpointer).
//! It exists solely for observability and verification.
//!
//! # PRIVACY INVARIANT
//! Telemetry events must **NEVER** contain user content (recognized text, audio, coordinates).
//! Only sources, priorities, reasons and counts are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{Service, TelemetryEvent};
pub use metrics::TelemetrySnapshot;
pub use recorder::Telemetry;
