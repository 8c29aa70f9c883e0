use std::sync::Arc;
use std::time::Duration;

use guidecane::hardware::sim::{EchoScript, ScriptedEcho};
use guidecane::kernel::alert::{Alert, Priority, PriorityBands};
use guidecane::kernel::channel::alert_channel;
use guidecane::kernel::state::SharedStateStore;
use guidecane::kernel::telemetry::Telemetry;
use guidecane::sensors::range::echo_to_distance_cm;
use guidecane::sensors::{RangeSensor, RangeTask};
use tokio_util::sync::CancellationToken;

fn expected(distance_cm: u32) -> Option<Priority> {
    if distance_cm < 30 {
        Some(Priority::High)
    } else if distance_cm < 60 {
        Some(Priority::Medium)
    } else if distance_cm < 100 {
        Some(Priority::Low)
    } else {
        None
    }
}

#[test]
fn test_every_distance_lands_in_its_band() {
    let store = SharedStateStore::new();
    let sensor = RangeSensor::new(PriorityBands::default(), store.clone());

    for distance_cm in 0..=400 {
        let alert = sensor.evaluate(Some(distance_cm));
        assert_eq!(alert.as_ref().map(Alert::priority), expected(distance_cm), "at {distance_cm} cm");
        if let Some(alert) = alert {
            assert_eq!(alert.distance_cm(), Some(distance_cm));
        }
        assert_eq!(store.last_range_cm(), Some(distance_cm));
    }
}

#[test]
fn test_no_echo_means_clear_ahead() {
    let store = SharedStateStore::new();
    let sensor = RangeSensor::new(PriorityBands::default(), store.clone());
    sensor.evaluate(Some(20));

    assert!(sensor.evaluate(None).is_none());
    assert_eq!(store.last_range_cm(), None, "a missing echo overwrites the last range");
}

#[test]
fn test_echo_conversion_matches_scripted_distances() {
    assert_eq!(echo_to_distance_cm(Duration::from_micros(0)), 0);
    // 29.1 us per cm, there and back
    assert_eq!(echo_to_distance_cm(Duration::from_micros(582)), 10);
    for cm in [1, 25, 29, 30, 59, 60, 99, 100, 250] {
        let EchoScript::Echo(echo) = ScriptedEcho::at_distance(cm) else {
            panic!("at_distance must script an echo");
        };
        assert_eq!(echo_to_distance_cm(echo), cm);
    }
}

#[tokio::test(start_paused = true)]
async fn test_hung_echo_times_out_as_no_obstacle() {
    let telemetry = Arc::new(Telemetry::new());
    let store = SharedStateStore::new();
    let (tx, mut rx) = alert_channel(10, telemetry.clone());
    let mut task = RangeTask::new(
        RangeSensor::new(PriorityBands::default(), store.clone()),
        ScriptedEcho::new([ScriptedEcho::at_distance(25), EchoScript::Hang]),
        tx,
        telemetry.clone(),
        Duration::from_millis(100),
        Duration::from_millis(30),
    );

    // 1. First cycle sees 25 cm
    assert!(task.cycle().await.unwrap().is_queued());
    assert_eq!(store.last_range_cm(), Some(25));

    // 2. Second cycle: the echo never comes back
    let started = tokio::time::Instant::now();
    assert!(task.cycle().await.is_none());
    assert_eq!(started.elapsed(), Duration::from_millis(30), "bounded by the echo timeout");
    assert_eq!(store.last_range_cm(), None);
    assert_eq!(telemetry.snapshot().sensing_stats.range_timeouts, 1);

    assert_eq!(rx.try_receive().unwrap().priority(), Priority::High);
    assert!(rx.try_receive().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_range_published_even_when_channel_full() {
    let telemetry = Arc::new(Telemetry::new());
    let store = SharedStateStore::new();
    let (tx, _rx) = alert_channel(1, telemetry.clone());
    let mut task = RangeTask::new(
        RangeSensor::new(PriorityBands::default(), store.clone()),
        ScriptedEcho::new([ScriptedEcho::at_distance(50), ScriptedEcho::at_distance(15)]),
        tx,
        telemetry.clone(),
        Duration::from_millis(100),
        Duration::from_millis(30),
    );

    assert!(task.cycle().await.unwrap().is_queued());
    assert!(!task.cycle().await.unwrap().is_queued());
    assert_eq!(store.last_range_cm(), Some(15));
    assert_eq!(telemetry.snapshot().alert_stats.dropped, 1);
}

#[tokio::test(start_paused = true)]
async fn test_task_samples_every_period_until_cancelled() {
    let telemetry = Arc::new(Telemetry::new());
    let store = SharedStateStore::new();
    let (tx, mut rx) = alert_channel(100, telemetry.clone());
    let task = RangeTask::new(
        RangeSensor::new(PriorityBands::default(), store.clone()),
        ScriptedEcho::new([ScriptedEcho::at_distance(70)]),
        tx,
        telemetry.clone(),
        Duration::from_millis(100),
        Duration::from_millis(30),
    );
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(task.run(cancel.clone()));

    // Ticks at 0, 100, 200, 300, 400
    tokio::time::sleep(Duration::from_millis(450)).await;
    cancel.cancel();
    let _ = handle.await.unwrap();

    let mut received = 0;
    while let Some(alert) = rx.try_receive() {
        assert_eq!(alert.priority(), Priority::Low);
        received += 1;
    }
    assert_eq!(received, 5);
}
