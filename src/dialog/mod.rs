//! The dialog layer: recognized speech in, a spoken reply out.
//!
//! Collaborator failures end here. Each one is logged, counted and turned
//! into a fixed spoken sentence; none propagates to the voice task.
//!
//! A whole reply shares one deadline derived from the response timeout. Each
//! request is bounded by the per-request timeout and by what is left of that
//! deadline, and the tail of the response timeout is held back so an apology
//! can still be spoken before the voice task gives up.

pub mod answer;
pub mod intent;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::kernel::alert::{Alert, Priority};
use crate::kernel::audio::session::CapturedUtterance;
use crate::kernel::channel::AlertSender;
use crate::kernel::state::{SharedStateStore, StateDelta};
use crate::kernel::telemetry::{Service, Telemetry, TelemetryEvent};
use crate::services::{
    Assistant, Geocoder, NetworkStatus, RoutePlanner, Speaker, Transcriber, WeatherService,
};
use crate::Result;
use intent::Intent;

/// How a voice session ended from the user's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Replied(String),
    /// Transcription came back empty
    NothingHeard,
    /// A collaborator failed; the apology that was spoken
    Failed(String),
}

/// Consumes an endpointed utterance.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, utterance: CapturedUtterance) -> DialogOutcome;
}

/// Collaborators the dialog talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub transcriber: Arc<dyn Transcriber>,
    pub assistant: Arc<dyn Assistant>,
    pub speaker: Arc<dyn Speaker>,
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn RoutePlanner>,
    pub weather: Arc<dyn WeatherService>,
}

pub struct DialogService {
    services: Collaborators,
    store: SharedStateStore,
    network: NetworkStatus,
    alerts: AlertSender,
    telemetry: Arc<Telemetry>,
    session_id: Uuid,
    request_timeout: Duration,
    /// Time for transcription and answering, counted from the hand-off
    answer_budget: Duration,
    /// Held back at the end of the response timeout for speaking
    speech_reserve: Duration,
    weather_location: String,
}

impl DialogService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        services: Collaborators,
        store: SharedStateStore,
        network: NetworkStatus,
        alerts: AlertSender,
        telemetry: Arc<Telemetry>,
        request_timeout: Duration,
        response_timeout: Duration,
        weather_location: impl Into<String>,
    ) -> Self {
        let speech_reserve = request_timeout.min(response_timeout / 4);
        Self {
            services,
            store,
            network,
            alerts,
            telemetry,
            session_id: Uuid::new_v4(),
            request_timeout,
            answer_budget: response_timeout.saturating_sub(speech_reserve),
            speech_reserve,
            weather_location: weather_location.into(),
        }
    }

    /// Conversation key sent with every assistant request.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Answers already-recognized text. Returns the reply, or the apology
    /// for the collaborator that failed.
    pub async fn answer(&self, text: &str) -> std::result::Result<String, Service> {
        self.answer_by(text, Instant::now() + self.answer_budget).await
    }

    async fn answer_by(
        &self,
        text: &str,
        deadline: Instant,
    ) -> std::result::Result<String, Service> {
        let intent = intent::parse(text);
        debug!(?intent, "routing");

        match intent {
            Intent::LightQuery => Ok(answer::light(self.store.signal_light())),
            Intent::AheadQuery => {
                let snapshot = self.store.snapshot();
                Ok(answer::ahead(
                    snapshot.last_range_cm,
                    snapshot.vision_obstacle_cm,
                    snapshot.path,
                ))
            }
            Intent::WhereAmI => Ok(answer::position(self.store.last_known_position())),
            Intent::Navigate { destination } => self.navigate(&destination, deadline).await,
            Intent::NextStep => Ok(self.next_step()),
            Intent::StopNavigation => {
                self.store.apply(StateDelta::NavigationCleared);
                Ok(answer::NAVIGATION_STOPPED.to_string())
            }
            Intent::Weather { day_offset } => {
                let forecast = self
                    .call(
                        Service::Weather,
                        self.services
                            .weather
                            .forecast(&self.weather_location, day_offset),
                        deadline,
                    )
                    .await?;
                Ok(answer::weather(&forecast, day_offset))
            }
            Intent::Chat(message) => {
                self.call(
                    Service::Assistant,
                    self.services.assistant.reply(&message, self.session_id),
                    deadline,
                )
                .await
            }
        }
    }

    async fn navigate(
        &self,
        destination: &str,
        deadline: Instant,
    ) -> std::result::Result<String, Service> {
        let Some(origin) = self.store.last_known_position() else {
            return Ok(answer::NO_FIX.to_string());
        };
        let target = self
            .call(
                Service::Geocoding,
                self.services.geocoder.geocode(destination),
                deadline,
            )
            .await?;
        let Some(target) = target else {
            return Ok(format!("Sorry, I couldn't find {destination}."));
        };
        let route = self
            .call(
                Service::Routing,
                self.services.router.walking_route(origin, target),
                deadline,
            )
            .await?;
        if route.steps.is_empty() {
            return Ok(answer::NO_ROUTE.to_string());
        }

        info!(
            steps = route.steps.len(),
            distance_m = route.total_distance_m,
            "navigation started"
        );
        let overview = answer::route_overview(&route);
        // A new route supersedes whatever was in progress
        self.store.apply(StateDelta::RouteStarted(route));
        self.cue();
        Ok(overview)
    }

    fn next_step(&self) -> String {
        if !self.store.navigation().is_active() {
            return answer::NOT_NAVIGATING.to_string();
        }
        match self.store.advance_step() {
            Some(step) => {
                self.cue();
                answer::step(&step)
            }
            None => answer::ARRIVED.to_string(),
        }
    }

    /// Short haptic cue that a navigation instruction follows.
    fn cue(&self) {
        let _ = self.alerts.try_send(Alert::navigation(Priority::Low));
    }

    async fn call<T>(
        &self,
        service: Service,
        request: impl Future<Output = Result<T>>,
        deadline: Instant,
    ) -> std::result::Result<T, Service> {
        let limit = deadline.min(Instant::now() + self.request_timeout);
        match timeout_at(limit, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(service = service.name(), error = %e, "collaborator failed");
                self.telemetry.record(TelemetryEvent::CollaboratorFailed(service));
                Err(service)
            }
            Err(_) => {
                warn!(
                    service = service.name(),
                    reply_deadline = limit == deadline,
                    "collaborator timed out"
                );
                self.telemetry.record(TelemetryEvent::CollaboratorFailed(service));
                Err(service)
            }
        }
    }

    async fn say(&self, text: &str) {
        self.say_within(text, self.request_timeout).await;
    }

    /// Failures are spoken inside the reserve so they land before the
    /// response timeout.
    async fn apologize(&self, service: Service) -> DialogOutcome {
        let apology = answer::failure(service);
        self.say_within(apology, self.speech_reserve).await;
        DialogOutcome::Failed(apology.to_string())
    }

    async fn say_within(&self, text: &str, limit: Duration) {
        if let Err(e) = timeout(limit, self.services.speaker.speak(text))
            .await
            .unwrap_or(Err(crate::Error::Timeout { service: "speech" }))
        {
            warn!(error = %e, "speech failed");
            self.telemetry
                .record(TelemetryEvent::CollaboratorFailed(Service::Speech));
        }
    }
}

#[async_trait]
impl Responder for DialogService {
    async fn respond(&self, utterance: CapturedUtterance) -> DialogOutcome {
        if !self.network.is_available() {
            info!("network unavailable, not transcribing");
            self.say_within(answer::NETWORK_UNAVAILABLE, self.speech_reserve)
                .await;
            return DialogOutcome::Failed(answer::NETWORK_UNAVAILABLE.to_string());
        }

        let deadline = Instant::now() + self.answer_budget;
        let text = match self
            .call(
                Service::Transcription,
                self.services.transcriber.transcribe(&utterance),
                deadline,
            )
            .await
        {
            Ok(text) => text,
            Err(service) => return self.apologize(service).await,
        };

        if text.trim().is_empty() {
            self.say(answer::NOT_HEARD).await;
            return DialogOutcome::NothingHeard;
        }
        info!(chars = text.chars().count(), "recognized");

        match self.answer_by(&text, deadline).await {
            Ok(reply) => {
                self.say(&reply).await;
                DialogOutcome::Replied(reply)
            }
            Err(service) => self.apologize(service).await,
        }
    }
}
