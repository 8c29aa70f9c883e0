//! Spoken sentences built from state snapshots and collaborator results.

use crate::kernel::navigation::{NavigationStep, Route};
use crate::kernel::telemetry::Service;
use crate::position::Coordinate;
use crate::services::Forecast;
use crate::vision::{LightStatus, PathStatus, SignalLightState};

pub const NETWORK_UNAVAILABLE: &str = "Sorry, the network is unavailable.";
pub const NOT_HEARD: &str = "Sorry, I didn't catch that.";
pub const NO_FIX: &str = "Sorry, I don't have a position fix yet.";
pub const NO_ROUTE: &str = "Sorry, I couldn't find a walking route.";
pub const NOT_NAVIGATING: &str = "There is no navigation in progress.";
pub const ARRIVED: &str = "You have arrived at your destination.";
pub const NAVIGATION_STOPPED: &str = "Navigation stopped.";

/// Fixed message for a collaborator that failed or timed out.
pub fn failure(service: Service) -> &'static str {
    match service {
        Service::Transcription => "Sorry, speech recognition failed.",
        Service::Assistant => "Sorry, I can't answer that right now.",
        Service::Speech => "Sorry, playback failed.",
        Service::Geocoding => "Sorry, I couldn't look up that place.",
        Service::Routing => "Sorry, route planning failed.",
        Service::Weather => "Sorry, I couldn't get the weather.",
        Service::LocationUplink => "Sorry, I couldn't share your location.",
    }
}

pub fn light(state: SignalLightState) -> String {
    match state.status {
        LightStatus::Unknown => "I can't see a traffic light.".to_string(),
        LightStatus::Red => format!(
            "The light is red, about {} seconds left. Please wait.",
            state.remaining_seconds
        ),
        LightStatus::Green => format!(
            "The light is green, about {} seconds left.",
            state.remaining_seconds
        ),
        LightStatus::Yellow => "The light is yellow. Please wait.".to_string(),
    }
}

/// Nearest of the ultrasonic and camera readings, plus the path.
pub fn ahead(range_cm: Option<u32>, vision_cm: Option<u32>, path: PathStatus) -> String {
    let nearest = match (range_cm, vision_cm) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    let obstacle = match nearest {
        Some(cm) if cm < 100 => format!("Obstacle {cm} centimetres ahead."),
        Some(cm) => format!("Clear for about {} metres.", cm / 100),
        None => "The way ahead is clear.".to_string(),
    };
    let path = match path {
        PathStatus::Centered => " You are on the tactile path.",
        PathStatus::OffLeft => " The tactile path is to your right.",
        PathStatus::OffRight => " The tactile path is to your left.",
        PathStatus::NoPath => " No tactile path detected.",
        PathStatus::Unknown => "",
    };
    format!("{obstacle}{path}")
}

pub fn position(position: Option<Coordinate>) -> String {
    match position {
        Some(Coordinate {
            latitude,
            longitude,
        }) => format!(
            "You are at latitude {:.4} {}, longitude {:.4} {}.",
            latitude.abs(),
            if latitude >= 0.0 { "north" } else { "south" },
            longitude.abs(),
            if longitude >= 0.0 { "east" } else { "west" },
        ),
        None => NO_FIX.to_string(),
    }
}

pub fn route_overview(route: &Route) -> String {
    let minutes = route.total_duration_s / 60;
    let mut text = format!(
        "Route planned, {} metres, about {} minutes on foot.",
        route.total_distance_m, minutes
    );
    if let Some(first) = route.steps.first() {
        text.push_str(&format!(" First, {}", step(first)));
    }
    text
}

pub fn step(step: &NavigationStep) -> String {
    let instruction = step.instruction.trim_end_matches(['.', '。']);
    format!("{instruction}, {} metres.", step.distance_m)
}

const DAY_NAMES: [&str; 3] = ["today", "tomorrow", "the day after tomorrow"];

pub fn weather(forecast: &Forecast, day_offset: u8) -> String {
    let day = DAY_NAMES
        .get(usize::from(day_offset))
        .copied()
        .unwrap_or("in the coming days");
    let mut text = format!(
        "{} weather {}: {}, {} to {} degrees",
        forecast.city, day, forecast.text_day, forecast.low_c, forecast.high_c
    );
    if !forecast.wind_direction.is_empty() {
        text.push_str(&format!(
            ", {} wind force {}",
            forecast.wind_direction, forecast.wind_scale
        ));
    }
    if !forecast.humidity.is_empty() {
        text.push_str(&format!(", humidity {}%", forecast.humidity));
    }
    text.push('.');

    if day_offset == 0 {
        let sky = forecast.text_day.to_lowercase();
        if sky.contains("rain") || sky.contains('雨') {
            text.push_str(" Take an umbrella.");
        } else if forecast.high_c >= 30 {
            text.push_str(" It's hot, stay cool.");
        } else if forecast.low_c <= 5 {
            text.push_str(" It's cold, dress warmly.");
        }
        if ["fog", "haze", "雾", "霾"].iter().any(|k| sky.contains(k)) {
            text.push_str(" Visibility is low, take care outside.");
        }
    }
    text
}
