use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use guidecane::dialog::Collaborators;
use guidecane::hardware::sim::{
    BlankCamera, EchoScript, LoggingActuator, ScriptedClassifier, ScriptedEcho, SyntheticMicrophone,
};
use guidecane::kernel::audio::endpointer::Trigger;
use guidecane::runtime::{Device, Peripherals};
use guidecane::services::amap::AmapClient;
use guidecane::services::backend::BackendClient;
use guidecane::services::mock::Unconfigured;
use guidecane::services::speech::CommandSpeaker;
use guidecane::services::weather::SeniverseClient;
use guidecane::services::{Geocoder, NetworkStatus, RoutePlanner, WeatherService};
use guidecane::Config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Desktop harness: simulated peripherals, real collaborators.
///
/// stdin commands:
///   `button`            press the talk button
///   `wake <confidence>` report a wake-word detection
///   `online` / `offline` flip network availability
///   `$GPRMC,...`        raw position sentence, as if from the receiver
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::var_os("GUIDECANE_CONFIG").map(PathBuf::from);
    let config = Config::load(path.as_deref()).context("loading configuration")?;
    tracing::info!(config = ?path, "Guidecane booting");

    let backend = Arc::new(BackendClient::new(&config.services)?);
    let (geocoder, router): (Arc<dyn Geocoder>, Arc<dyn RoutePlanner>) =
        match AmapClient::new(&config.services) {
            Ok(amap) => {
                let amap = Arc::new(amap);
                (amap.clone(), amap)
            }
            Err(e) => {
                tracing::warn!(error = %e, "navigation disabled");
                (Arc::new(Unconfigured("geocoding")), Arc::new(Unconfigured("routing")))
            }
        };
    let weather: Arc<dyn WeatherService> = match SeniverseClient::new(&config.services) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "weather disabled");
            Arc::new(Unconfigured("weather"))
        }
    };
    let services = Collaborators {
        transcriber: backend.clone(),
        assistant: backend.clone(),
        speaker: Arc::new(CommandSpeaker::new(config.services.speech_command.clone())),
        geocoder,
        router,
        weather,
    };

    let (serial_rx, mut serial_tx) = tokio::io::duplex(config.position.buffer_capacity);
    let peripherals = Peripherals {
        actuator: LoggingActuator::default(),
        // Something 45 cm ahead, then a clear path
        echo: ScriptedEcho::new([
            ScriptedEcho::at_distance(45),
            EchoScript::Nothing,
        ]),
        camera: BlankCamera { frame_len: 64 },
        classifier: ScriptedClassifier::default(),
        microphone: SyntheticMicrophone::new([(800, 16_000)]),
        serial: serial_rx,
    };

    let network = NetworkStatus::new(true);
    let device = Device::spawn(&config, peripherals, services, backend, network.clone());
    let triggers = device.triggers();

    tracing::info!("Guidecane running. Press Ctrl+C to stop.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.starts_with('$') {
                    serial_tx.write_all(line.as_bytes()).await?;
                    serial_tx.write_all(b"\r\n").await?;
                } else if line == "button" {
                    let _ = triggers.send(Trigger::Button).await;
                } else if let Some(confidence) = line.strip_prefix("wake ") {
                    match confidence.trim().parse() {
                        Ok(confidence) => {
                            let _ = triggers.send(Trigger::WakeWord { confidence }).await;
                        }
                        Err(_) => tracing::warn!(line, "expected `wake <confidence>`"),
                    }
                } else if line == "online" || line == "offline" {
                    network.set_available(line == "online");
                } else if !line.is_empty() {
                    tracing::warn!(line, "unknown command");
                }
            }
        }
    }

    let telemetry = device.telemetry().snapshot();
    device.shutdown().await;
    tracing::info!(
        actuated = telemetry.alert_stats.actuated(),
        drop_ratio = telemetry.alert_stats.drop_ratio(),
        endpointed = telemetry.voice_stats.endpointed(),
        abandoned = telemetry.voice_stats.abandoned,
        collaborator_failures = telemetry.collaborator_failures,
        "Guidecane stopped"
    );
    tracing::debug!(?telemetry, "final counters");
    Ok(())
}
