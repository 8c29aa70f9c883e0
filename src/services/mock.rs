//! In-memory collaborators for the desktop binary and the test suite.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Assistant, Forecast, Geocoder, LocationUplink, RoutePlanner, Speaker, Transcriber, WeatherService};
use crate::kernel::audio::session::CapturedUtterance;
use crate::kernel::navigation::Route;
use crate::position::Coordinate;
use crate::{Error, Result};

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hands out queued transcripts, then empty text.
#[derive(Debug, Default)]
pub struct ScriptedTranscriber {
    texts: Mutex<VecDeque<Result<String>>>,
    heard: Mutex<Vec<usize>>,
}

impl ScriptedTranscriber {
    pub fn new(texts: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            texts: Mutex::new(texts.into_iter().map(|t| Ok(t.to_string())).collect()),
            heard: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            texts: Mutex::new(VecDeque::from([Err(Error::collaborator(
                "transcription",
                "scripted failure",
            ))])),
            heard: Mutex::new(Vec::new()),
        }
    }

    /// Sample counts of every utterance received.
    pub fn heard(&self) -> Vec<usize> {
        locked(&self.heard).clone()
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, utterance: &CapturedUtterance) -> Result<String> {
        locked(&self.heard).push(utterance.samples.len());
        locked(&self.texts).pop_front().unwrap_or_else(|| Ok(String::new()))
    }
}

/// Replies with a fixed prefix, or fails when built with `failing`.
#[derive(Debug, Default)]
pub struct EchoAssistant {
    fail: bool,
    messages: Mutex<Vec<(String, Uuid)>>,
}

impl EchoAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, Uuid)> {
        locked(&self.messages).clone()
    }
}

#[async_trait]
impl Assistant for EchoAssistant {
    async fn reply(&self, message: &str, session_id: Uuid) -> Result<String> {
        locked(&self.messages).push((message.to_string(), session_id));
        if self.fail {
            return Err(Error::collaborator("assistant", "scripted failure"));
        }
        Ok(format!("You said: {message}"))
    }
}

/// Keeps everything it was asked to say.
#[derive(Debug, Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        locked(&self.spoken).clone()
    }

    pub fn last(&self) -> Option<String> {
        locked(&self.spoken).last().cloned()
    }
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        tracing::info!(text, "speak");
        locked(&self.spoken).push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinate>,
}

impl StaticGeocoder {
    pub fn new(places: impl IntoIterator<Item = (&'static str, Coordinate)>) -> Self {
        Self {
            places: places
                .into_iter()
                .map(|(name, position)| (name.to_string(), position))
                .collect(),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
        Ok(self.places.get(address).copied())
    }
}

/// Returns the same route for every request and remembers the requests.
#[derive(Debug, Default)]
pub struct StaticRoutePlanner {
    route: Route,
    requests: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl StaticRoutePlanner {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Coordinate, Coordinate)> {
        locked(&self.requests).clone()
    }
}

#[async_trait]
impl RoutePlanner for StaticRoutePlanner {
    async fn walking_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        locked(&self.requests).push((origin, destination));
        Ok(self.route.clone())
    }
}

/// Forecasts indexed by day offset.
#[derive(Debug, Default)]
pub struct StaticWeather {
    days: Vec<Forecast>,
}

impl StaticWeather {
    pub fn new(days: Vec<Forecast>) -> Self {
        Self { days }
    }
}

#[async_trait]
impl WeatherService for StaticWeather {
    async fn forecast(&self, _location: &str, day_offset: u8) -> Result<Forecast> {
        self.days
            .get(usize::from(day_offset))
            .cloned()
            .ok_or_else(|| Error::collaborator("weather", "no forecast for that day"))
    }
}

#[derive(Debug, Default)]
pub struct RecordingUplink {
    reports: Mutex<Vec<Coordinate>>,
}

impl RecordingUplink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Coordinate> {
        locked(&self.reports).clone()
    }
}

#[async_trait]
impl LocationUplink for RecordingUplink {
    async fn report(&self, position: Coordinate) -> Result<()> {
        locked(&self.reports).push(position);
        Ok(())
    }
}

/// Stands in for a collaborator whose credentials are missing.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

impl Unconfigured {
    fn error(&self) -> Error {
        Error::collaborator(self.0, "not configured")
    }
}

#[async_trait]
impl Geocoder for Unconfigured {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinate>> {
        Err(self.error())
    }
}

#[async_trait]
impl RoutePlanner for Unconfigured {
    async fn walking_route(&self, _origin: Coordinate, _destination: Coordinate) -> Result<Route> {
        Err(self.error())
    }
}

#[async_trait]
impl WeatherService for Unconfigured {
    async fn forecast(&self, _location: &str, _day_offset: u8) -> Result<Forecast> {
        Err(self.error())
    }
}
