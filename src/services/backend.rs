//! HTTP client for the device backend: transcription, assistant and
//! location uplink share one base URL and one connection pool.

use std::io::Cursor;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{Assistant, LocationUplink, Transcriber};
use crate::config::ServicesConfig;
use crate::kernel::audio::session::CapturedUtterance;
use crate::position::Coordinate;
use crate::{Error, Result};

/// Reply the backend sends when its own upstream call failed.
pub const ASSISTANT_FAILURE_SENTINEL: &str = "请求失败";

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct TranscriptionRequest {
    /// Base64 of a 16-bit PCM WAV file
    pcm_data: String,
    rate: u32,
    channels: u16,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct AssistantRequest<'a> {
    message: &'a str,
    session_id: Uuid,
}

#[derive(Deserialize)]
struct AssistantResponse {
    response: String,
}

#[derive(Serialize)]
struct LocationReport {
    latitude: f64,
    longitude: f64,
}

impl BackendClient {
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B, service: &'static str) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::collaborator(
                service,
                format!("backend returned {}", response.status()),
            ));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Transcriber for BackendClient {
    async fn transcribe(&self, utterance: &CapturedUtterance) -> Result<String> {
        let wav = samples_to_wav(&utterance.samples, utterance.sample_rate, utterance.channels)?;
        debug!(wav_bytes = wav.len(), "sending transcription request");
        let request = TranscriptionRequest {
            pcm_data: base64::engine::general_purpose::STANDARD.encode(wav),
            rate: utterance.sample_rate,
            channels: utterance.channels,
        };
        let response: TranscriptionResponse = self.post("/asr", &request, "transcription").await?;
        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl Assistant for BackendClient {
    async fn reply(&self, message: &str, session_id: Uuid) -> Result<String> {
        let request = AssistantRequest {
            message,
            session_id,
        };
        let response: AssistantResponse = self.post("/ai", &request, "assistant").await?;
        let reply = response.response.trim();
        if reply.is_empty() || reply == ASSISTANT_FAILURE_SENTINEL {
            return Err(Error::collaborator("assistant", "backend reported failure"));
        }
        Ok(reply.to_string())
    }
}

#[async_trait]
impl LocationUplink for BackendClient {
    async fn report(&self, position: Coordinate) -> Result<()> {
        let report = LocationReport {
            latitude: position.latitude,
            longitude: position.longitude,
        };
        let response = self
            .client
            .post(format!("{}/gps", self.base_url))
            .json(&report)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::collaborator(
                "location uplink",
                format!("backend returned {}", response.status()),
            ));
        }
        Ok(())
    }
}

/// Encodes interleaved 16-bit samples as an in-memory WAV file.
pub fn samples_to_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }
        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
