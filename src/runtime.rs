//! Wires every task of the device together under one cancellation token.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::audio::{sample_ring, MicrophoneFeed, VoiceProcessor};
use crate::config::Config;
use crate::dialog::{Collaborators, DialogService};
use crate::hardware::{Actuator, EchoSource, FrameSource, Microphone};
use crate::kernel::arbiter::AlertArbiter;
use crate::kernel::audio::endpointer::Trigger;
use crate::kernel::channel::alert_channel;
use crate::kernel::state::SharedStateStore;
use crate::kernel::telemetry::Telemetry;
use crate::position::{LocationReporter, PositionTracker};
use crate::sensors::{RangeSensor, RangeTask};
use crate::services::{LocationUplink, NetworkStatus};
use crate::vision::{Classifier, VisionPipeline, VisionResultAdapter};

const TRIGGER_CAPACITY: usize = 4;

/// Everything the core drives or samples.
pub struct Peripherals<A, E, F, C, M, S> {
    pub actuator: A,
    pub echo: E,
    pub camera: F,
    pub classifier: C,
    pub microphone: M,
    /// Raw serial stream from the positioning receiver
    pub serial: S,
}

/// A running device: the shared store, telemetry and every task handle.
pub struct Device {
    store: SharedStateStore,
    telemetry: Arc<Telemetry>,
    network: NetworkStatus,
    triggers: mpsc::Sender<Trigger>,
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Device {
    /// Spawns all tasks on the current runtime.
    pub fn spawn<A, E, F, C, M, S>(
        config: &Config,
        peripherals: Peripherals<A, E, F, C, M, S>,
        services: Collaborators,
        uplink: Arc<dyn LocationUplink>,
        network: NetworkStatus,
    ) -> Self
    where
        A: Actuator + 'static,
        E: EchoSource + 'static,
        F: FrameSource + 'static,
        C: Classifier + 'static,
        M: Microphone + 'static,
        S: AsyncRead + Unpin + Send + 'static,
    {
        let store = SharedStateStore::new();
        let telemetry = Arc::new(Telemetry::new());
        let cancel = CancellationToken::new();
        let bands = config.alerts.bands();
        let (alerts, alert_rx) = alert_channel(config.alerts.channel_capacity, telemetry.clone());
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_CAPACITY);
        let mut tasks = Vec::new();

        let arbiter = AlertArbiter::new(alert_rx, peripherals.actuator, telemetry.clone());
        tasks.push(("arbiter", spawn_until(&cancel, |c| async move {
            arbiter.run(c).await;
        })));

        let range = RangeTask::new(
            RangeSensor::new(bands, store.clone()),
            peripherals.echo,
            alerts.clone(),
            telemetry.clone(),
            config.range.period(),
            config.range.echo_timeout(),
        );
        tasks.push(("range", spawn_until(&cancel, |c| async move {
            range.run(c).await;
        })));

        let vision = VisionPipeline::new(
            peripherals.camera,
            peripherals.classifier,
            VisionResultAdapter::new(
                bands,
                config.vision.confidence_floor,
                store.clone(),
                telemetry.clone(),
            ),
            alerts.clone(),
            Duration::from_millis(config.vision.period_ms),
        );
        tasks.push(("vision", spawn_until(&cancel, |c| vision.run(c))));

        let tracker = PositionTracker::new(
            config.position.buffer_capacity,
            store.clone(),
            telemetry.clone(),
        );
        let serial = peripherals.serial;
        tasks.push(("position", spawn_until(&cancel, |c| tracker.run(serial, c))));

        let reporter = LocationReporter::new(
            store.clone(),
            network.clone(),
            uplink,
            telemetry.clone(),
            Duration::from_millis(config.position.report_period_ms),
            config.services.request_timeout(),
        );
        tasks.push(("uplink", spawn_until(&cancel, |c| reporter.run(c))));

        let (producer, consumer) = sample_ring(config.voice.ring_capacity);
        let chunk = config.voice.frame_samples.max(1);
        let chunk_period = Duration::from_millis(
            (chunk as u64 * 1000 / u64::from(config.voice.sample_rate.max(1))).max(1),
        );
        let feed = MicrophoneFeed::new(peripherals.microphone, producer, chunk, chunk_period);
        tasks.push(("microphone", spawn_until(&cancel, |c| async move {
            feed.run(c).await;
        })));

        let dialog = DialogService::new(
            services,
            store.clone(),
            network.clone(),
            alerts,
            telemetry.clone(),
            config.services.request_timeout(),
            config.voice.response_timeout(),
            config.dialog.weather_location.clone(),
        );
        let voice = VoiceProcessor::new(
            consumer,
            trigger_rx,
            &config.voice,
            Arc::new(dialog),
            telemetry.clone(),
        );
        tasks.push(("voice", spawn_until(&cancel, |c| voice.run(c))));

        info!(tasks = tasks.len(), "Device running");
        Self {
            store,
            telemetry,
            network,
            triggers: trigger_tx,
            cancel,
            tasks,
        }
    }

    pub fn store(&self) -> &SharedStateStore {
        &self.store
    }

    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    /// Button edges and wake-word detections go here.
    pub fn triggers(&self) -> mpsc::Sender<Trigger> {
        self.triggers.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels every task and waits for each to finish.
    pub async fn shutdown(self) {
        info!("Device shutting down");
        self.cancel.cancel();
        for (name, handle) in self.tasks {
            if let Err(e) = handle.await {
                warn!(task = name, error = %e, "task ended abnormally");
            }
        }
        info!("Device stopped");
    }
}

fn spawn_until<Fut>(cancel: &CancellationToken, task: impl FnOnce(CancellationToken) -> Fut) -> JoinHandle<()>
where
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(task(cancel.child_token()))
}
