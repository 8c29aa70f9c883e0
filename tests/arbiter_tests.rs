use std::sync::Arc;
use std::time::Duration;

use guidecane::hardware::sim::RecordingActuator;
use guidecane::kernel::alert::{Alert, Priority};
use guidecane::kernel::arbiter::AlertArbiter;
use guidecane::kernel::channel::alert_channel;
use guidecane::kernel::pattern::{bursts, pattern_for, total_duration};
use guidecane::kernel::telemetry::Telemetry;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[test]
fn test_pattern_shapes() {
    assert_eq!(bursts(pattern_for(Priority::High)), 2);
    assert_eq!(bursts(pattern_for(Priority::Medium)), 1);
    assert_eq!(bursts(pattern_for(Priority::Low)), 1);

    assert!(pattern_for(Priority::Low).iter().all(|s| !s.tone), "Low is vibration only");
    assert!(pattern_for(Priority::Medium).iter().all(|s| s.vibrate && s.tone));

    assert_eq!(total_duration(pattern_for(Priority::High)), Duration::from_millis(400));
    assert_eq!(total_duration(pattern_for(Priority::Medium)), Duration::from_millis(300));
    assert_eq!(total_duration(pattern_for(Priority::Low)), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_high_alert_plays_two_bursts() {
    let telemetry = Arc::new(Telemetry::new());
    let (tx, rx) = alert_channel(10, telemetry.clone());
    let actuator = RecordingActuator::new();
    let mut arbiter = AlertArbiter::new(rx, actuator.clone(), telemetry.clone());

    arbiter.actuate(&Alert::obstacle(Priority::High, 20)).await;
    drop(tx);

    assert_eq!(actuator.vibration_bursts(), 2);
    assert_eq!(actuator.tone_bursts(), 2);
    let last = actuator.events().last().copied().unwrap();
    assert!(!last.vibration && !last.tone, "arbiter must leave outputs quiet");
    assert_eq!(telemetry.snapshot().alert_stats.actuated_high, 1);
}

#[tokio::test(start_paused = true)]
async fn test_low_alert_never_sounds_buzzer() {
    let telemetry = Arc::new(Telemetry::new());
    let (_tx, rx) = alert_channel(10, telemetry.clone());
    let actuator = RecordingActuator::new();
    let mut arbiter = AlertArbiter::new(rx, actuator.clone(), telemetry);

    let start = Instant::now();
    arbiter.actuate(&Alert::obstacle(Priority::Low, 80)).await;

    assert_eq!(actuator.vibration_bursts(), 1);
    assert_eq!(actuator.tone_bursts(), 0);
    assert_eq!(start.elapsed(), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_patterns_run_back_to_back_without_overlap() {
    let telemetry = Arc::new(Telemetry::new());
    let (tx, rx) = alert_channel(10, telemetry.clone());
    let actuator = RecordingActuator::new();
    let arbiter = AlertArbiter::new(rx, actuator.clone(), telemetry.clone());

    // 1. Queue three alerts before the arbiter starts
    assert!(tx.try_send(Alert::obstacle(Priority::High, 10)).is_queued());
    assert!(tx.try_send(Alert::signal_light(Priority::Medium, 30)).is_queued());
    assert!(tx.try_send(Alert::path_deviation(Priority::Low, false)).is_queued());
    drop(tx);

    // 2. Run until the channel closes
    let start = Instant::now();
    arbiter.run(CancellationToken::new()).await;

    // 3. Strictly sequential: total time is the sum of the patterns
    assert_eq!(start.elapsed(), Duration::from_millis(400 + 300 + 200));
    assert_eq!(actuator.vibration_bursts(), 4);
    assert_eq!(actuator.tone_bursts(), 3);

    let stats = telemetry.snapshot().alert_stats;
    assert_eq!(stats.actuated(), 3);
    assert_eq!((stats.actuated_high, stats.actuated_medium, stats.actuated_low), (1, 1, 1));
}

#[tokio::test(start_paused = true)]
async fn test_alerts_arriving_mid_pattern_wait_in_channel() {
    let telemetry = Arc::new(Telemetry::new());
    let (tx, rx) = alert_channel(1, telemetry.clone());
    let actuator = RecordingActuator::new();
    let arbiter = AlertArbiter::new(rx, actuator.clone(), telemetry.clone());
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(arbiter.run(cancel.clone()));

    assert!(tx.try_send(Alert::obstacle(Priority::Medium, 40)).is_queued());
    tokio::time::sleep(Duration::from_millis(50)).await;

    // 1. Pattern playing: one waits, the next is dropped
    assert!(tx.try_send(Alert::obstacle(Priority::Low, 90)).is_queued());
    assert!(!tx.try_send(Alert::obstacle(Priority::Low, 95)).is_queued());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    cancel.cancel();
    let _ = handle.await.unwrap();

    let stats = telemetry.snapshot().alert_stats;
    assert_eq!(stats.actuated_medium, 1);
    assert_eq!(stats.actuated_low, 1);
    assert_eq!(stats.dropped, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_idle_arbiter_quietly() {
    let telemetry = Arc::new(Telemetry::new());
    let (_tx, rx) = alert_channel(4, telemetry.clone());
    let actuator = RecordingActuator::new();
    let arbiter = AlertArbiter::new(rx, actuator.clone(), telemetry);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(arbiter.run(cancel.clone()));

    cancel.cancel();
    let _ = handle.await.unwrap();
    assert!(actuator.events().is_empty(), "nothing was ever switched on");
}
