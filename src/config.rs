//! Static device configuration
//!
//! Loaded once at startup from an optional TOML file. Every field has a
//! default, so the file is a partial overlay and an absent file is valid.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::kernel::alert::PriorityBands;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub alerts: AlertsConfig,
    pub range: RangeConfig,
    pub vision: VisionConfig,
    pub voice: VoiceConfig,
    pub position: PositionConfig,
    pub services: ServicesConfig,
    pub dialog: DialogConfig,
}

/// Alert channel sizing and the distance bands shared by every obstacle producer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub channel_capacity: usize,
    pub high_below_cm: u32,
    pub medium_below_cm: u32,
    pub low_below_cm: u32,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 10,
            high_below_cm: 30,
            medium_below_cm: 60,
            low_below_cm: 100,
        }
    }
}

impl AlertsConfig {
    pub fn bands(&self) -> PriorityBands {
        PriorityBands {
            high_below_cm: self.high_below_cm,
            medium_below_cm: self.medium_below_cm,
            low_below_cm: self.low_below_cm,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub period_ms: u64,
    /// Upper bound on the wait for an echo edge
    pub echo_timeout_ms: u64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            period_ms: 100,
            echo_timeout_ms: 30,
        }
    }
}

impl RangeConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub period_ms: u64,
    /// Results below this confidence (0-100) update state but never alert
    pub confidence_floor: u8,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            period_ms: 200,
            confidence_floor: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per frame handed to the endpointer
    pub frame_samples: usize,
    /// Mean absolute amplitude below which a frame counts as silence
    pub silence_threshold: u32,
    pub silence_ceiling_ms: u64,
    pub max_recording_ms: u64,
    /// Sessions with fewer voiced frames are abandoned as noise
    pub min_voiced_frames: u32,
    pub wake_word_threshold: f32,
    pub response_timeout_ms: u64,
    /// Re-arm after a reply instead of waiting for a new trigger
    pub continue_conversation: bool,
    /// Microphone ring buffer size in samples
    pub ring_capacity: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            frame_samples: 512,
            silence_threshold: 50,
            silence_ceiling_ms: 1000,
            max_recording_ms: 5000,
            min_voiced_frames: 2,
            wake_word_threshold: 0.6,
            response_timeout_ms: 8000,
            continue_conversation: true,
            ring_capacity: 8192,
        }
    }
}

impl VoiceConfig {
    /// Capture buffer size that holds exactly `max_recording_ms` of audio
    pub fn capture_capacity(&self) -> usize {
        let per_second = self.sample_rate as u64 * u64::from(self.channels);
        (per_second * self.max_recording_ms / 1000) as usize
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    pub buffer_capacity: usize,
    pub report_period_ms: u64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 600,
            report_period_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub backend_url: String,
    pub amap_url: String,
    pub amap_key: String,
    pub weather_url: String,
    pub weather_key: String,
    pub request_timeout_ms: u64,
    /// Program used to speak replies on the host
    pub speech_command: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:12345".to_string(),
            amap_url: "https://restapi.amap.com".to_string(),
            amap_key: String::new(),
            weather_url: "https://api.seniverse.com".to_string(),
            weather_key: String::new(),
            request_timeout_ms: 5000,
            speech_command: "say".to_string(),
        }
    }
}

impl ServicesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Location name handed to the weather service
    pub weather_location: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            weather_location: "ip".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or fall back to defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or fails validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns error if the text is not valid TOML for this schema
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.alerts.channel_capacity == 0 {
            return Err(Error::Config("alerts.channel_capacity must be > 0".into()));
        }
        let a = &self.alerts;
        if !(a.high_below_cm < a.medium_below_cm && a.medium_below_cm < a.low_below_cm) {
            return Err(Error::Config(
                "alerts bands must satisfy high < medium < low".into(),
            ));
        }
        if self.range.period_ms == 0 || self.range.echo_timeout_ms == 0 {
            return Err(Error::Config(
                "range.period_ms and echo_timeout_ms must be > 0".into(),
            ));
        }
        if self.vision.period_ms == 0 {
            return Err(Error::Config("vision.period_ms must be > 0".into()));
        }
        if self.vision.confidence_floor > 100 {
            return Err(Error::Config("vision.confidence_floor must be <= 100".into()));
        }
        let v = &self.voice;
        if v.sample_rate == 0 || v.channels == 0 || v.frame_samples == 0 {
            return Err(Error::Config(
                "voice.sample_rate, channels and frame_samples must be > 0".into(),
            ));
        }
        if v.ring_capacity < v.frame_samples {
            return Err(Error::Config(
                "voice.ring_capacity must hold at least one frame".into(),
            ));
        }
        if v.max_recording_ms == 0 || v.silence_ceiling_ms == 0 {
            return Err(Error::Config(
                "voice.max_recording_ms and silence_ceiling_ms must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&v.wake_word_threshold) {
            return Err(Error::Config(
                "voice.wake_word_threshold must be within 0.0..=1.0".into(),
            ));
        }
        if self.position.buffer_capacity < 16 {
            return Err(Error::Config("position.buffer_capacity must be >= 16".into()));
        }
        if self.position.report_period_ms == 0 {
            return Err(Error::Config("position.report_period_ms must be > 0".into()));
        }
        if v.response_timeout_ms == 0 || self.services.request_timeout_ms == 0 {
            return Err(Error::Config(
                "voice.response_timeout_ms and services.request_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
