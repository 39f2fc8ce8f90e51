use std::time::Duration;
use stream_decorators::timer::{OnceTask, RepeatingTask};
use stream_decorators::*;
use tokio::time::MissedTickBehavior;

#[test]
fn test_timer_config_defaults() {
    let config = TimerConfig::default();
    assert_eq!(config.missed_ticks, MissedTicks::Delay);
    assert_eq!(config.min_period, Duration::from_millis(1));

    assert!(config.accepts(Duration::from_millis(1)));
    assert!(config.accepts(Duration::from_secs(3600)));
    assert!(!config.accepts(Duration::from_micros(999)));
    assert!(!config.accepts(Duration::ZERO));
}

#[test]
fn test_zero_minimum_still_rejects_zero_period() {
    let config = TimerConfig {
        min_period: Duration::ZERO,
        ..TimerConfig::default()
    };
    assert!(config.accepts(Duration::from_nanos(1)));
    assert!(!config.accepts(Duration::ZERO));
}

#[test]
fn test_timer_config_partial_deserialization() {
    let config: TimerConfig = serde_json::from_str(r#"{"missed_ticks":"Skip"}"#).unwrap();
    assert_eq!(config.missed_ticks, MissedTicks::Skip);
    assert_eq!(config.min_period, Duration::from_millis(1));

    let config: TimerConfig =
        serde_json::from_str(r#"{"min_period":{"secs":0,"nanos":5000000}}"#).unwrap();
    assert_eq!(config.missed_ticks, MissedTicks::Delay);
    assert_eq!(config.min_period, Duration::from_millis(5));

    let config: TimerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, TimerConfig::default());
}

#[test]
fn test_timer_config_serde_round_trip() {
    let config = TimerConfig {
        missed_ticks: MissedTicks::Burst,
        min_period: Duration::from_millis(250),
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: TimerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_missed_ticks_maps_to_tokio_behavior() {
    assert_eq!(MissedTickBehavior::from(MissedTicks::Burst), MissedTickBehavior::Burst);
    assert_eq!(MissedTickBehavior::from(MissedTicks::Delay), MissedTickBehavior::Delay);
    assert_eq!(MissedTickBehavior::from(MissedTicks::Skip), MissedTickBehavior::Skip);
}

#[tokio::test]
async fn test_tokio_timer_rejects_short_period() {
    let timer = TokioTimer::with_config(TimerConfig {
        min_period: Duration::from_millis(100),
        ..TimerConfig::default()
    });
    assert_eq!(timer.config().min_period, Duration::from_millis(100));

    let task: RepeatingTask = Box::new(|| {});
    match timer.schedule_repeating(Duration::from_millis(10), task) {
        Err(StreamError::InvalidPeriod { period, minimum }) => {
            assert_eq!(period, Duration::from_millis(10));
            assert_eq!(minimum, Duration::from_millis(100));
        }
        other => panic!("expected InvalidPeriod, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_tokio_timer_release_cancels_pending_task() {
    let timer = TokioTimer::new();
    let (tx, rx) = futures::channel::oneshot::channel::<()>();

    let task: OnceTask = Box::new(move || {
        let _ = tx.send(());
    });
    let release = timer.schedule_once(Duration::from_millis(10), task).unwrap();
    drop(release);

    tokio::time::sleep(Duration::from_millis(50)).await;
    // The aborted task dropped the sender without firing
    assert_eq!(rx.await, Err(futures::channel::oneshot::Canceled));
}

#[test]
fn test_stream_error_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    assert_eq!(StreamError::from(io), StreamError::IO("missing".to_string()));
    assert_eq!(StreamError::from("plain"), StreamError::Failed("plain".to_string()));
    assert_eq!(
        StreamError::from(futures::channel::oneshot::Canceled),
        StreamError::CallbackDropped
    );
    assert_eq!(StreamError::failed(42).to_string(), "42");
}
