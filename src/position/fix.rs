use serde::{Deserialize, Serialize};

/// Decimal degrees, north and east positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One parsed position sentence.
///
/// Coordinates are only meaningful when `valid`; a void sentence carries
/// zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// `hhmmss(.sss)` as sent by the receiver
    pub utc_time: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub valid: bool,
}

impl GpsFix {
    pub fn void(utc_time: impl Into<String>) -> Self {
        Self {
            utc_time: utc_time.into(),
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            valid: false,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.valid.then_some(Coordinate {
            latitude: self.latitude_deg,
            longitude: self.longitude_deg,
        })
    }
}
