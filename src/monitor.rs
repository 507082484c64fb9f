//! Watchlist monitor
//!
//! Periodically re-evaluates every watched address and alerts when one
//! stops passing. The interval is re-read from the policy before every
//! sleep, so `/policy` changes apply from the next cycle.

use crate::evaluator::SafetyEvaluator;
use crate::metrics::MetricsState;
use crate::models::{TokenAddress, Verdict};
use crate::notifications::{CompositeNotifier, NotificationEvent};
use crate::policy::PolicyStore;
use crate::watchlist::Watchlist;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of one pass over the watchlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Addresses whose evaluation completed
    pub checked: usize,
    /// Addresses that started failing their rules this cycle
    pub flagged: usize,
    /// Addresses that could not be verified this cycle
    pub unverifiable: usize,
    /// Evaluations cut off by the per-address timeout
    pub timed_out: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchStatus {
    Passing,
    Unverifiable,
    Failing,
}

impl WatchStatus {
    fn of(verdict: &Verdict) -> Self {
        if verdict.admitted {
            WatchStatus::Passing
        } else if verdict.has_data_gaps() {
            WatchStatus::Unverifiable
        } else {
            WatchStatus::Failing
        }
    }
}

/// Re-evaluation loop state
pub struct WatchlistMonitor {
    evaluator: Arc<SafetyEvaluator>,
    watchlist: Arc<Watchlist>,
    policy: Arc<PolicyStore>,
    notifier: Arc<CompositeNotifier>,
    metrics: Arc<MetricsState>,
    evaluation_timeout: Duration,
}

impl WatchlistMonitor {
    pub fn new(
        evaluator: Arc<SafetyEvaluator>,
        watchlist: Arc<Watchlist>,
        policy: Arc<PolicyStore>,
        notifier: Arc<CompositeNotifier>,
        metrics: Arc<MetricsState>,
        evaluation_timeout: Duration,
    ) -> Self {
        Self {
            evaluator,
            watchlist,
            policy,
            notifier,
            metrics,
            evaluation_timeout,
        }
    }

    /// Evaluate every watched address once, concurrently.
    ///
    /// Alerts fire only on a status change, so a token that keeps failing
    /// is reported once.
    pub async fn run_cycle(&self) -> CycleSummary {
        let addresses = self.watchlist.addresses();
        let mut summary = CycleSummary::default();

        let results = join_all(addresses.into_iter().map(|address| async move {
            let outcome =
                tokio::time::timeout(self.evaluation_timeout, self.evaluator.evaluate(&address))
                    .await;
            (address, outcome)
        }))
        .await;

        for (address, outcome) in results {
            let Ok(verdict) = outcome else {
                tracing::warn!(
                    address = %address,
                    timeout_ms = self.evaluation_timeout.as_millis() as u64,
                    "Re-evaluation timed out, keeping previous verdict"
                );
                summary.timed_out += 1;
                continue;
            };

            // Unwatched while the evaluation was running
            let Some(previous) = self.watchlist.record_verdict(verdict.clone()) else {
                continue;
            };
            summary.checked += 1;

            let status = WatchStatus::of(&verdict);
            if status == WatchStatus::of(&previous) {
                continue;
            }

            match status {
                WatchStatus::Passing => {
                    tracing::info!(address = %address, "Watched address passes again");
                }
                WatchStatus::Failing => {
                    summary.flagged += 1;
                    self.alert_failed(&address, &verdict).await;
                }
                WatchStatus::Unverifiable => {
                    summary.unverifiable += 1;
                    self.alert_unverifiable(&address, &verdict).await;
                }
            }
        }

        self.metrics.watchlist_size.set(self.watchlist.len() as i64);
        summary
    }

    async fn alert_failed(&self, address: &TokenAddress, verdict: &Verdict) {
        tracing::warn!(
            address = %address,
            failed_rules = ?verdict.reasons(),
            "Watched address no longer passes security checks"
        );
        self.notifier
            .notify(NotificationEvent::WatchedTokenFailed {
                address: address.to_string(),
                reasons: verdict.reasons().into_iter().map(String::from).collect(),
            })
            .await;
    }

    async fn alert_unverifiable(&self, address: &TokenAddress, verdict: &Verdict) {
        tracing::warn!(
            address = %address,
            unavailable = ?verdict.unavailable,
            "Watched address could not be verified"
        );
        self.notifier
            .notify(NotificationEvent::WatchedTokenUnverifiable {
                address: address.to_string(),
                sources: verdict
                    .unavailable
                    .iter()
                    .map(|source| source.as_str().to_string())
                    .collect(),
            })
            .await;
    }
}

/// Run the monitor until cancelled.
///
/// Each cycle runs on its own task; a panicking cycle is logged and
/// reported, and the loop carries on with the next tick.
pub async fn run_monitor(monitor: Arc<WatchlistMonitor>, cancel_token: CancellationToken) {
    tracing::info!(
        interval_secs = monitor.policy.snapshot().polling_interval,
        "Starting watchlist monitor"
    );

    let mut cycle = 0u64;

    loop {
        let interval = monitor.policy.snapshot().polling_interval();
        tokio::select! {
            _ = cancel_token.cancelled() => {
                tracing::info!("Watchlist monitor shutting down");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        cycle += 1;
        monitor
            .metrics
            .watchlist_size
            .set(monitor.watchlist.len() as i64);
        if monitor.watchlist.is_empty() {
            if cycle % 10 == 0 {
                tracing::debug!("Watchlist empty, nothing to monitor");
            }
            continue;
        }

        let task = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.run_cycle().await }
        });

        match task.await {
            Ok(summary) => {
                tracing::debug!(
                    cycle = cycle,
                    checked = summary.checked,
                    flagged = summary.flagged,
                    unverifiable = summary.unverifiable,
                    timed_out = summary.timed_out,
                    "Monitor cycle complete"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, cycle = cycle, "Monitor cycle failed");
                monitor
                    .notifier
                    .notify(NotificationEvent::MonitorCycleFailed {
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    }
}
