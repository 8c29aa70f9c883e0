use std::sync::Arc;

use guidecane::hardware::sim::{BlankCamera, ScriptedClassifier};
use guidecane::hardware::FrameSource;
use guidecane::kernel::alert::{AlertExtra, AlertSource, Priority, PriorityBands};
use guidecane::kernel::channel::alert_channel;
use guidecane::kernel::state::SharedStateStore;
use guidecane::kernel::telemetry::Telemetry;
use guidecane::vision::{
    ClassificationKind, ClassificationResult, LightStatus, PathStatus, SignalLightState,
    VisionPipeline, VisionResultAdapter,
};

fn adapter() -> (VisionResultAdapter, SharedStateStore, Arc<Telemetry>) {
    let store = SharedStateStore::new();
    let telemetry = Arc::new(Telemetry::new());
    let adapter = VisionResultAdapter::new(PriorityBands::default(), 60, store.clone(), telemetry.clone());
    (adapter, store, telemetry)
}

#[test]
fn test_red_light_updates_store_and_raises_medium() {
    let (adapter, store, _) = adapter();

    let alert = adapter
        .adapt(&ClassificationResult::light(LightStatus::Red, Some(30), 90))
        .expect("red light must alert");

    assert_eq!(alert.source(), AlertSource::SignalLight);
    assert_eq!(alert.priority(), Priority::Medium);
    assert_eq!(alert.extra(), Some(AlertExtra::RemainingSeconds(30)));
    assert_eq!(
        store.signal_light(),
        SignalLightState {
            status: LightStatus::Red,
            remaining_seconds: 30
        }
    );
}

#[test]
fn test_other_lights_update_store_silently() {
    let (adapter, store, _) = adapter();

    assert!(adapter
        .adapt(&ClassificationResult::light(LightStatus::Green, Some(12), 95))
        .is_none());
    assert_eq!(store.signal_light().status, LightStatus::Green);
    assert_eq!(store.signal_light().remaining_seconds, 12);

    assert!(adapter
        .adapt(&ClassificationResult::light(LightStatus::Unknown, Some(7), 95))
        .is_none());
    assert_eq!(store.signal_light(), SignalLightState::default());
}

#[test]
fn test_missing_countdown_uses_defaults() {
    assert_eq!(SignalLightState::new(LightStatus::Red, None).remaining_seconds, 30);
    assert_eq!(SignalLightState::new(LightStatus::Green, None).remaining_seconds, 40);
    assert_eq!(SignalLightState::new(LightStatus::Yellow, None).remaining_seconds, 5);
    assert_eq!(SignalLightState::new(LightStatus::Unknown, None).remaining_seconds, 0);
}

#[test]
fn test_path_deviation_priorities() {
    let (adapter, store, _) = adapter();

    let no_path = adapter
        .adapt(&ClassificationResult::path(PathStatus::NoPath, 80))
        .unwrap();
    assert_eq!(no_path.priority(), Priority::Medium);
    assert_eq!(no_path.extra(), Some(AlertExtra::NoPathDetected));

    let drifted = adapter
        .adapt(&ClassificationResult::path(PathStatus::OffLeft, 80))
        .unwrap();
    assert_eq!(drifted.source(), AlertSource::PathDeviation);
    assert_eq!(drifted.priority(), Priority::Low);
    assert_eq!(drifted.extra(), None);

    assert!(adapter
        .adapt(&ClassificationResult::path(PathStatus::Centered, 80))
        .is_none());
    assert_eq!(store.snapshot().path, PathStatus::Centered);
}

#[test]
fn test_obstacle_uses_range_bands() {
    let (adapter, store, _) = adapter();

    let near = adapter.adapt(&ClassificationResult::obstacle(Some(45), 70)).unwrap();
    assert_eq!((near.source(), near.priority()), (AlertSource::Obstacle, Priority::Medium));
    assert_eq!(near.distance_cm(), Some(45));

    assert!(adapter.adapt(&ClassificationResult::obstacle(Some(150), 70)).is_none());
    assert_eq!(store.snapshot().vision_obstacle_cm, Some(150));

    assert!(adapter.adapt(&ClassificationResult::obstacle(None, 70)).is_none());
    assert_eq!(store.snapshot().vision_obstacle_cm, None);
}

#[test]
fn test_low_confidence_reaches_store_but_never_alerts() {
    let (adapter, store, telemetry) = adapter();

    assert!(adapter
        .adapt(&ClassificationResult::light(LightStatus::Red, Some(20), 59))
        .is_none());
    assert!(adapter
        .adapt(&ClassificationResult::obstacle(Some(10), 10))
        .is_none());

    assert_eq!(store.signal_light().status, LightStatus::Red);
    assert_eq!(store.snapshot().vision_obstacle_cm, Some(10));
    assert_eq!(telemetry.snapshot().sensing_stats.below_confidence_floor, 2);

    // The floor itself is accepted
    assert!(adapter
        .adapt(&ClassificationResult::light(LightStatus::Red, Some(20), 60))
        .is_some());
}

#[test]
fn test_confidence_is_clamped_and_kind_reported() {
    let result = ClassificationResult::obstacle(Some(1), 250);
    assert_eq!(result.confidence, 100);
    assert_eq!(result.kind(), ClassificationKind::Obstacle);
}

struct NoCamera;

impl FrameSource for NoCamera {
    fn capture(&mut self) -> Option<Vec<u8>> {
        None
    }
}

#[tokio::test]
async fn test_pipeline_forwards_every_result_of_a_frame() {
    let (adapter, store, telemetry) = adapter();
    let (tx, mut rx) = alert_channel(10, telemetry);
    let classifier = ScriptedClassifier::new([vec![
        ClassificationResult::path(PathStatus::OffRight, 90),
        ClassificationResult::light(LightStatus::Red, None, 90),
        ClassificationResult::obstacle(Some(200), 90),
    ]]);
    let mut pipeline = VisionPipeline::new(
        BlankCamera { frame_len: 16 },
        classifier,
        adapter,
        tx,
        std::time::Duration::from_millis(200),
    );

    assert_eq!(pipeline.cycle(), 2);
    assert_eq!(rx.try_receive().unwrap().source(), AlertSource::PathDeviation);
    assert_eq!(rx.try_receive().unwrap().source(), AlertSource::SignalLight);
    assert_eq!(store.signal_light().remaining_seconds, 30);

    // Classifier has nothing more to say
    assert_eq!(pipeline.cycle(), 0);
}

#[tokio::test]
async fn test_capture_failure_is_silent() {
    let (adapter, store, telemetry) = adapter();
    let (tx, mut rx) = alert_channel(10, telemetry);
    let classifier = ScriptedClassifier::new([vec![ClassificationResult::obstacle(Some(5), 99)]]);
    let mut pipeline = VisionPipeline::new(
        NoCamera,
        classifier,
        adapter,
        tx,
        std::time::Duration::from_millis(200),
    );

    assert_eq!(pipeline.cycle(), 0);
    assert!(rx.try_receive().is_none());
    assert_eq!(store.snapshot().version, 0, "no frame, no new context");
}
