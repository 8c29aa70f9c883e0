//! Recommended-minimum position sentence parsing.

use thiserror::Error;

use super::fix::GpsFix;

/// Sentence prefixes the receiver may emit (GPS-only and multi-constellation).
pub const PREFIXES: [&str; 2] = ["$GPRMC,", "$GNRMC,"];

const ACTIVE: &str = "A";
const VOID: &str = "V";

// id, time, status, lat, N/S, lon, E/W and the delimiter that closes E/W
const REQUIRED_FIELDS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SentenceError {
    #[error("unrecognized sentence prefix")]
    UnknownPrefix,
    #[error("missing field {0}")]
    MissingField(usize),
    #[error("checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    Checksum { expected: u8, computed: u8 },
    #[error("invalid validity flag {0:?}")]
    InvalidStatus(String),
    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),
    #[error("invalid hemisphere {0:?}")]
    InvalidHemisphere(String),
}

/// Parses one sentence without its `\r\n` terminator.
pub fn parse(sentence: &str) -> Result<GpsFix, SentenceError> {
    if !PREFIXES.iter().any(|prefix| sentence.starts_with(prefix)) {
        return Err(SentenceError::UnknownPrefix);
    }
    let body = verify_checksum(sentence)?;

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < REQUIRED_FIELDS {
        return Err(SentenceError::MissingField(fields.len()));
    }

    let utc_time = fields[1];
    match fields[2] {
        ACTIVE => {}
        VOID => return Ok(GpsFix::void(utc_time)),
        other => return Err(SentenceError::InvalidStatus(other.to_string())),
    }

    let latitude = signed(degrees_minutes(fields[3])?, fields[4], "N", "S")?;
    let longitude = signed(degrees_minutes(fields[5])?, fields[6], "E", "W")?;

    Ok(GpsFix {
        utc_time: utc_time.to_string(),
        latitude_deg: latitude,
        longitude_deg: longitude,
        valid: true,
    })
}

/// `DDDMM.MMMM` to decimal degrees.
pub fn degrees_minutes(field: &str) -> Result<f64, SentenceError> {
    let value: f64 = field
        .parse()
        .map_err(|_| SentenceError::InvalidCoordinate(field.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(SentenceError::InvalidCoordinate(field.to_string()));
    }
    let degrees = (value / 100.0).floor();
    let minutes = value - degrees * 100.0;
    Ok(degrees + minutes / 60.0)
}

/// XOR of every byte between `$` and `*`.
pub fn checksum(body: &str) -> u8 {
    body.bytes().skip(1).fold(0, |acc, b| acc ^ b)
}

/// Strips and checks a trailing `*hh` when present.
fn verify_checksum(sentence: &str) -> Result<&str, SentenceError> {
    let Some((body, hex)) = sentence.rsplit_once('*') else {
        return Ok(sentence);
    };
    let expected = u8::from_str_radix(hex.trim(), 16).map_err(|_| SentenceError::Checksum {
        expected: 0,
        computed: checksum(body),
    })?;
    let computed = checksum(body);
    if expected != computed {
        return Err(SentenceError::Checksum { expected, computed });
    }
    Ok(body)
}

fn signed(value: f64, hemisphere: &str, positive: &str, negative: &str) -> Result<f64, SentenceError> {
    if hemisphere == positive {
        Ok(value)
    } else if hemisphere == negative {
        Ok(-value)
    } else {
        Err(SentenceError::InvalidHemisphere(hemisphere.to_string()))
    }
}
