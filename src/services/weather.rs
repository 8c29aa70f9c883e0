//! Seniverse daily forecast.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{Forecast, WeatherService};
use crate::config::ServicesConfig;
use crate::{Error, Result};

/// Days requested per call: today, tomorrow, the day after.
pub const FORECAST_DAYS: u8 = 3;

#[derive(Clone)]
pub struct SeniverseClient {
    client: Client,
    base_url: String,
    key: String,
}

#[derive(Deserialize)]
struct DailyResponse {
    #[serde(default)]
    results: Vec<DailyResult>,
}

#[derive(Deserialize)]
struct DailyResult {
    location: Location,
    #[serde(default)]
    daily: Vec<Day>,
}

#[derive(Deserialize)]
struct Location {
    name: String,
}

#[derive(Deserialize)]
struct Day {
    date: String,
    text_day: String,
    text_night: String,
    high: Value,
    low: Value,
    #[serde(default)]
    wind_direction: String,
    #[serde(default)]
    wind_scale: String,
    #[serde(default)]
    humidity: String,
}

impl SeniverseClient {
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        if config.weather_key.is_empty() {
            return Err(Error::Config("weather_key required for forecasts".to_string()));
        }
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.weather_url.trim_end_matches('/').to_string(),
            key: config.weather_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherService for SeniverseClient {
    async fn forecast(&self, location: &str, day_offset: u8) -> Result<Forecast> {
        if day_offset >= FORECAST_DAYS {
            return Err(Error::collaborator("weather", "day offset out of range"));
        }
        let days = FORECAST_DAYS.to_string();
        let response: DailyResponse = self
            .client
            .get(format!("{}/v3/weather/daily.json", self.base_url))
            .query(&[
                ("key", self.key.as_str()),
                ("location", location),
                ("language", "en"),
                ("unit", "c"),
                ("start", "0"),
                ("days", days.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::collaborator("weather", "no results"))?;
        let day = result
            .daily
            .into_iter()
            .nth(usize::from(day_offset))
            .ok_or_else(|| Error::collaborator("weather", "forecast too short"))?;

        Ok(Forecast {
            city: result.location.name,
            date: day.date,
            text_day: day.text_day,
            text_night: day.text_night,
            high_c: degrees(&day.high),
            low_c: degrees(&day.low),
            wind_direction: day.wind_direction,
            wind_scale: day.wind_scale,
            humidity: day.humidity,
        })
    }
}

fn degrees(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
