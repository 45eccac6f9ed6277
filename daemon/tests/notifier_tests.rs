mod common;

use common::{at, RecordingNotifier};
use governor_daemon::controller::ActionReport;
use governor_daemon::notifier::{AlertKind, NotificationDispatcher, NotificationMethod, Notifier};
use governor_daemon::policy::{DecisionState, Edge};
use std::time::{Duration, Instant};

fn edge(to: DecisionState, timestamp: Instant) -> Edge {
    Edge {
        from: DecisionState::Normal,
        to,
        usage: 900_000,
        timestamp,
    }
}

fn dispatcher(notifier: &RecordingNotifier, cooldown_secs: u64, on_resume: bool) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Box::new(notifier.clone()),
        Duration::from_secs(cooldown_secs),
        on_resume,
    )
}

#[test]
fn test_alert_per_edge_kind() {
    let notifier = RecordingNotifier::default();
    let mut d = dispatcher(&notifier, 0, true);
    let base = Instant::now();
    let report = ActionReport {
        suspended: vec!["foo".to_string(), "bar".to_string()],
        ..Default::default()
    };

    assert_eq!(
        d.dispatch(&edge(DecisionState::Approaching, base), &ActionReport::default(), 1_000_000),
        Some(AlertKind::Approaching)
    );
    assert_eq!(
        d.dispatch(&edge(DecisionState::Exceeded, base), &report, 1_000_000),
        Some(AlertKind::Suspended)
    );
    assert_eq!(
        d.dispatch(&edge(DecisionState::Normal, base), &ActionReport::default(), 1_000_000),
        Some(AlertKind::Resumed)
    );
    assert_eq!(notifier.summaries().len(), 3);
    assert!(notifier.bodies()[1].ends_with("suspended foo, bar"));
}

#[test]
fn test_suspended_alert_names_only_suspended_processes() {
    let notifier = RecordingNotifier::default();
    let mut d = dispatcher(&notifier, 0, true);
    d.dispatch(
        &edge(DecisionState::Exceeded, Instant::now()),
        &ActionReport::default(),
        1_000_000,
    );
    assert!(notifier.bodies()[0].contains("no watched processes were running"));
}

#[test]
fn test_repeated_alerts_are_debounced() {
    let notifier = RecordingNotifier::default();
    let mut d = dispatcher(&notifier, 60, true);
    let base = Instant::now();
    let none = ActionReport::default();

    assert!(d.dispatch(&edge(DecisionState::Approaching, base), &none, 1_000).is_some());
    assert!(d.dispatch(&edge(DecisionState::Approaching, at(base, 30)), &none, 1_000).is_none());
    // Other kinds have their own cooldown.
    assert!(d.dispatch(&edge(DecisionState::Exceeded, at(base, 31)), &none, 1_000).is_some());
    assert!(d.dispatch(&edge(DecisionState::Approaching, at(base, 60)), &none, 1_000).is_some());
    assert_eq!(notifier.summaries().len(), 3);
}

#[test]
fn test_resume_alert_is_optional() {
    let notifier = RecordingNotifier::default();
    let mut d = dispatcher(&notifier, 0, false);
    assert!(d
        .dispatch(&edge(DecisionState::Normal, Instant::now()), &ActionReport::default(), 1_000)
        .is_none());
    assert!(notifier.summaries().is_empty());
}

#[test]
fn test_failed_delivery_is_swallowed() {
    let notifier = RecordingNotifier::failing();
    let mut d = dispatcher(&notifier, 0, true);
    let kind = d.dispatch(
        &edge(DecisionState::Approaching, Instant::now()),
        &ActionReport::default(),
        1_000,
    );
    assert_eq!(kind, Some(AlertKind::Approaching));
}

#[test]
fn test_disabled_method_is_a_no_op() {
    let notifier = NotificationMethod::None.notifier();
    assert!(notifier.notify("summary", "body").is_ok());
    assert!(NotificationMethod::Log.notifier().notify("summary", "body").is_ok());
}
