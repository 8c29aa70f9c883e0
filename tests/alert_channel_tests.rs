use std::sync::Arc;
use std::time::Duration;

use guidecane::kernel::alert::{Alert, AlertSource, Priority};
use guidecane::kernel::channel::{alert_channel, SendOutcome};
use guidecane::kernel::telemetry::Telemetry;

#[tokio::test]
async fn test_fifo_across_producers() {
    let telemetry = Arc::new(Telemetry::new());
    let (range_tx, mut rx) = alert_channel(10, telemetry.clone());
    let vision_tx = range_tx.clone();

    // 1. Interleave two producers
    assert!(range_tx.try_send(Alert::obstacle(Priority::Low, 80)).is_queued());
    assert!(vision_tx.try_send(Alert::signal_light(Priority::Medium, 30)).is_queued());
    assert!(range_tx.try_send(Alert::obstacle(Priority::High, 10)).is_queued());

    // 2. Receive order is send order, not priority order
    let order: Vec<(AlertSource, Priority)> = [
        rx.receive().await.unwrap(),
        rx.receive().await.unwrap(),
        rx.receive().await.unwrap(),
    ]
    .iter()
    .map(|a| (a.source(), a.priority()))
    .collect();

    assert_eq!(
        order,
        vec![
            (AlertSource::Obstacle, Priority::Low),
            (AlertSource::SignalLight, Priority::Medium),
            (AlertSource::Obstacle, Priority::High),
        ]
    );
}

#[tokio::test]
async fn test_full_channel_drops_newest_without_blocking() {
    let telemetry = Arc::new(Telemetry::new());
    let (tx, mut rx) = alert_channel(2, telemetry.clone());

    assert!(tx.try_send(Alert::obstacle(Priority::Low, 90)).is_queued());
    assert!(tx.try_send(Alert::obstacle(Priority::Medium, 50)).is_queued());
    assert_eq!(tx.queued(), 2);

    // 1. A full channel hands the alert straight back
    let outcome = tokio::time::timeout(Duration::from_millis(50), async {
        tx.try_send(Alert::obstacle(Priority::High, 5))
    })
    .await
    .expect("try_send must never wait");

    match outcome {
        SendOutcome::Dropped(alert) => assert_eq!(alert.distance_cm(), Some(5)),
        other => panic!("expected drop, got {other:?}"),
    }

    // 2. Queue unchanged: the oldest alerts keep their places
    assert_eq!(tx.queued(), 2, "drop must not change queue size");
    assert_eq!(rx.receive().await.unwrap().distance_cm(), Some(90));
    assert_eq!(rx.receive().await.unwrap().distance_cm(), Some(50));
    assert!(rx.try_receive().is_none());

    let stats = telemetry.snapshot().alert_stats;
    assert_eq!(stats.queued, 2);
    assert_eq!(stats.dropped, 1);
    assert!((stats.drop_ratio() - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_send_after_consumer_gone_reports_closed() {
    let telemetry = Arc::new(Telemetry::new());
    let (tx, rx) = alert_channel(4, telemetry.clone());
    drop(rx);

    let outcome = tx.try_send(Alert::navigation(Priority::Low));
    assert!(matches!(outcome, SendOutcome::Closed(_)));

    // Counted apart from overload drops
    let stats = telemetry.snapshot().alert_stats;
    assert_eq!(stats.closed, 1);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.queued, 0);
    assert_eq!(stats.drop_ratio(), 0.0);
}

#[tokio::test]
async fn test_zero_capacity_is_raised_to_one() {
    let (tx, mut rx) = alert_channel(0, Arc::new(Telemetry::new()));

    assert_eq!(tx.capacity(), 1);
    assert!(tx.try_send(Alert::obstacle(Priority::High, 1)).is_queued());
    assert!(!tx.try_send(Alert::obstacle(Priority::High, 2)).is_queued());
    assert_eq!(rx.queued(), 1);
}

#[test]
fn test_only_obstacles_carry_distance() {
    assert_eq!(Alert::obstacle(Priority::High, 12).distance_cm(), Some(12));
    assert_eq!(Alert::path_deviation(Priority::Low, false).distance_cm(), None);
    assert_eq!(Alert::signal_light(Priority::Medium, 30).distance_cm(), None);
    assert_eq!(Alert::navigation(Priority::Low).distance_cm(), None);
}
