//! AMap web service: geocoding and walking routes.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Geocoder, RoutePlanner};
use crate::config::ServicesConfig;
use crate::kernel::navigation::{NavigationStep, Route};
use crate::position::Coordinate;
use crate::{Error, Result};

const OK: &str = "1";

#[derive(Clone)]
pub struct AmapClient {
    client: Client,
    base_url: String,
    key: String,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    geocodes: Vec<Geocode>,
}

#[derive(Deserialize)]
struct Geocode {
    /// "lng,lat"
    location: String,
}

#[derive(Deserialize)]
struct WalkingResponse {
    status: String,
    #[serde(default)]
    info: String,
    route: Option<WalkingRoute>,
}

#[derive(Deserialize)]
struct WalkingRoute {
    #[serde(default)]
    paths: Vec<WalkingPath>,
}

// AMap sends numbers as strings and empty text fields as `[]`
#[derive(Deserialize)]
struct WalkingPath {
    #[serde(default)]
    distance: Value,
    #[serde(default)]
    cost: Value,
    #[serde(default)]
    steps: Vec<WalkingStep>,
}

#[derive(Deserialize)]
struct WalkingStep {
    #[serde(default)]
    instruction: Value,
    #[serde(default)]
    orientation: Value,
    #[serde(default)]
    road_name: Value,
    #[serde(default)]
    step_distance: Value,
}

impl AmapClient {
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        if config.amap_key.is_empty() {
            return Err(Error::Config("amap_key required for navigation".to_string()));
        }
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.amap_url.trim_end_matches('/').to_string(),
            key: config.amap_key.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for AmapClient {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
        let response: GeocodeResponse = self
            .client
            .get(format!("{}/v3/geocode/geo", self.base_url))
            .query(&[("address", address), ("output", "json"), ("key", self.key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != OK {
            return Err(Error::collaborator("geocoding", "request rejected"));
        }
        Ok(response
            .geocodes
            .first()
            .and_then(|geocode| parse_lng_lat(&geocode.location)))
    }
}

#[async_trait]
impl RoutePlanner for AmapClient {
    async fn walking_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        let origin = format_lng_lat(origin);
        let destination = format_lng_lat(destination);
        let response: WalkingResponse = self
            .client
            .get(format!("{}/v5/direction/walking", self.base_url))
            .query(&[
                ("isindoor", "0"),
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("show_fields", "cost"),
                ("key", self.key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != OK {
            return Err(Error::collaborator("routing", response.info));
        }
        let Some(path) = response.route.and_then(|route| route.paths.into_iter().next()) else {
            return Ok(Route::default());
        };

        let steps: Vec<NavigationStep> = path
            .steps
            .iter()
            .map(|step| NavigationStep {
                instruction: text(&step.instruction),
                orientation: text(&step.orientation),
                road_name: text(&step.road_name),
                distance_m: number(&step.step_distance),
            })
            .collect();
        debug!(steps = steps.len(), "walking route received");

        Ok(Route {
            steps,
            total_distance_m: number(&path.distance),
            total_duration_s: number(&path.cost["duration"]),
        })
    }
}

/// AMap coordinates are longitude first.
pub fn format_lng_lat(position: Coordinate) -> String {
    format!("{:.6},{:.6}", position.longitude, position.latitude)
}

pub fn parse_lng_lat(text: &str) -> Option<Coordinate> {
    let (lng, lat) = text.split_once(',')?;
    Some(Coordinate {
        latitude: lat.trim().parse().ok()?,
        longitude: lng.trim().parse().ok()?,
    })
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

fn number(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
