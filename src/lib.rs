//! Control core of a guidance cane: sensing tasks raise prioritized alerts,
//! a single arbiter turns them into vibration and tone patterns, and a voice
//! state machine decides when the user has finished speaking.

pub mod audio;
pub mod config;
pub mod dialog;
pub mod error;
pub mod hardware;
pub mod kernel;
pub mod position;
pub mod runtime;
pub mod sensors;
pub mod services;
pub mod vision;

pub use config::Config;
pub use error::{Error, Result};
pub use runtime::Device;
