//! Watchlist monitor tests

use crate::common::{addr, fixture, Fixture};
use pair_sentinel::monitor::{run_monitor, CycleSummary, WatchlistMonitor};
use pair_sentinel::notifications::NotificationService;
use pair_sentinel::{
    CompositeNotifier, FetchError, MarketReport, NotificationEvent, PolicyField, Verdict,
    Watchlist,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

#[async_trait::async_trait]
impl NotificationService for RecordingNotifier {
    async fn notify(&self, event: NotificationEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

struct Harness {
    fx: Fixture,
    watchlist: Arc<Watchlist>,
    recorder: Arc<RecordingNotifier>,
    monitor: Arc<WatchlistMonitor>,
}

fn harness(evaluation_timeout: Duration) -> Harness {
    let fx = fixture(&[]);
    let watchlist = Arc::new(Watchlist::new());
    let recorder = Arc::new(RecordingNotifier::default());

    let mut notifier = CompositeNotifier::new();
    notifier.add_service(recorder.clone());

    let monitor = Arc::new(WatchlistMonitor::new(
        fx.evaluator.clone(),
        watchlist.clone(),
        fx.policy.clone(),
        Arc::new(notifier),
        fx.metrics.clone(),
        evaluation_timeout,
    ));

    Harness {
        fx,
        watchlist,
        recorder,
        monitor,
    }
}

/// Watch an address as if /watch had admitted it
fn watch(h: &Harness, address: &str) {
    h.watchlist
        .insert(Verdict::from_failures(addr(address), vec![], vec![]));
}

#[tokio::test]
async fn test_cycle_without_changes_is_quiet() {
    let h = harness(Duration::from_secs(5));
    watch(&h, "TokenA");
    watch(&h, "TokenB");

    let summary = h.monitor.run_cycle().await;

    assert_eq!(
        summary,
        CycleSummary {
            checked: 2,
            ..CycleSummary::default()
        }
    );
    assert!(h.recorder.events.lock().is_empty());
    assert_eq!(h.fx.metrics.watchlist_size.get(), 2);
}

#[tokio::test]
async fn test_cycle_flags_token_that_starts_failing() {
    let h = harness(Duration::from_secs(5));
    watch(&h, "TokenA");
    // Sells now outweigh buys
    h.fx
        .market
        .set(Ok(MarketReport::new(50_000.0, 10_000.0, 40, 90)));

    let summary = h.monitor.run_cycle().await;

    assert_eq!(summary.checked, 1);
    assert_eq!(summary.flagged, 1);
    {
        let events = h.recorder.events.lock();
        assert_eq!(events.len(), 1);
        match &events[0] {
            NotificationEvent::WatchedTokenFailed { address, reasons } => {
                assert_eq!(address, "TokenA");
                assert_eq!(reasons, &vec!["buy-pressure".to_string()]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    let entry = h.watchlist.get(&addr("TokenA")).unwrap();
    assert!(!entry.last_verdict.admitted);

    // Still failing: no second alert
    let summary = h.monitor.run_cycle().await;
    assert_eq!(summary.flagged, 0);
    assert_eq!(h.recorder.events.lock().len(), 1);
}

#[tokio::test]
async fn test_cycle_reports_unverifiable_token() {
    let h = harness(Duration::from_secs(5));
    watch(&h, "TokenA");
    h.fx.market.set(Err(FetchError::Timeout));

    let summary = h.monitor.run_cycle().await;

    assert_eq!(summary.unverifiable, 1);
    assert_eq!(summary.flagged, 0);
    let events = h.recorder.events.lock();
    assert!(matches!(
        &events[0],
        NotificationEvent::WatchedTokenUnverifiable { sources, .. } if sources == &vec!["market".to_string()]
    ));
}

#[tokio::test]
async fn test_cycle_survives_timed_out_evaluation() {
    let h = harness(Duration::from_millis(100));
    watch(&h, "TokenA");
    h.fx.risk.set_delay(Some(Duration::from_millis(500)));

    let summary = h.monitor.run_cycle().await;

    assert_eq!(summary.timed_out, 1);
    assert_eq!(summary.checked, 0);
    // Previous verdict kept
    assert!(h.watchlist.get(&addr("TokenA")).unwrap().last_verdict.admitted);

    h.fx.risk.set_delay(None);
    let summary = h.monitor.run_cycle().await;
    assert_eq!(summary.checked, 1);
    assert_eq!(summary.timed_out, 0);
}

#[tokio::test]
async fn test_monitor_stops_on_cancel() {
    let h = harness(Duration::from_secs(5));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_monitor(h.monitor.clone(), cancel.clone()));
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("monitor should stop promptly")
        .unwrap();
}

/// The size gauge catches up even once the watchlist has been emptied
#[tokio::test]
async fn test_gauge_tracks_emptied_watchlist() {
    let h = harness(Duration::from_secs(5));
    watch(&h, "TokenA");
    h.monitor.run_cycle().await;
    assert_eq!(h.fx.metrics.watchlist_size.get(), 1);

    h.watchlist.remove(&addr("TokenA"));
    h.fx.policy.update(PolicyField::PollingInterval, "1").unwrap();

    let cancel = CancellationToken::new();
    let task = tokio::spawn(run_monitor(h.monitor.clone(), cancel.clone()));
    tokio::time::sleep(Duration::from_millis(1300)).await;
    cancel.cancel();
    task.await.unwrap();

    assert_eq!(h.fx.metrics.watchlist_size.get(), 0);
}
