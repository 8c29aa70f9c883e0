//! External collaborators the core calls: request/response contracts only.
//!
//! Every implementation must bound its own latency; callers additionally wrap
//! each call in a timeout so a dead network path never stalls a task.

pub mod amap;
pub mod backend;
pub mod mock;
pub mod network;
pub mod speech;
pub mod weather;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::audio::session::CapturedUtterance;
use crate::kernel::navigation::Route;
use crate::position::Coordinate;
use crate::Result;

pub use network::NetworkStatus;

/// Speech-to-text. Empty text means nothing was recognized.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, utterance: &CapturedUtterance) -> Result<String>;
}

/// Conversational assistant keyed by a per-device session.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn reply(&self, message: &str, session_id: Uuid) -> Result<String>;
}

/// Text-to-speech and playback. Fire-and-forget from the core's view.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Free-text address to coordinate. `None` when nothing matched.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>>;
}

#[async_trait]
pub trait RoutePlanner: Send + Sync {
    async fn walking_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route>;
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    /// `day_offset` 0 is today, 1 tomorrow, 2 the day after.
    async fn forecast(&self, location: &str, day_offset: u8) -> Result<Forecast>;
}

/// Uploads the device position to the backend.
#[async_trait]
pub trait LocationUplink: Send + Sync {
    async fn report(&self, position: Coordinate) -> Result<()>;
}

/// One day of forecast, already reduced to what gets spoken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub date: String,
    pub text_day: String,
    pub text_night: String,
    pub high_c: i32,
    pub low_c: i32,
    pub wind_direction: String,
    pub wind_scale: String,
    pub humidity: String,
}
