//! Monitoring run orchestration
//!
//! One run checks every endpoint in order, updates the status store, and only
//! then delivers the queued alerts and recovery notices.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alerting::{should_send_alert_with_ceiling, AlertDecision, Notifier};
use crate::checker::Checker;
use crate::clock::Clock;
use crate::models::{Endpoint, PendingAlert, PendingRecovery};
use crate::store::StatusStore;

/// What happened during one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Endpoints checked
    pub checked: usize,
    /// Failing endpoints with their errors
    pub failures: Vec<(String, Option<String>)>,
    /// Alerts delivered and recorded
    pub alerts_sent: usize,
    /// Alerts whose delivery failed
    pub alerts_failed: usize,
    /// Failures kept quiet by the backoff window
    pub alerts_suppressed: usize,
    /// Recovery notices delivered
    pub recoveries_sent: usize,
    /// Recovery notices whose delivery failed
    pub recoveries_failed: usize,
}

/// Drives checks, state updates, and notifications for a set of endpoints
pub struct Monitor<C, N, K> {
    endpoints: Vec<Endpoint>,
    checker: C,
    notifier: N,
    clock: K,
    realert_ceiling_secs: f64,
}

impl<C, N, K> Monitor<C, N, K>
where
    C: Checker,
    N: Notifier,
    K: Clock,
{
    /// Create a new monitor
    pub fn new(
        endpoints: Vec<Endpoint>,
        checker: C,
        notifier: N,
        clock: K,
        realert_ceiling_secs: f64,
    ) -> Self {
        Self {
            endpoints,
            checker,
            notifier,
            clock,
            realert_ceiling_secs,
        }
    }

    /// Perform one monitoring pass over all endpoints
    pub async fn run(&self, store: &mut StatusStore) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut alerts = Vec::new();
        let mut recoveries = Vec::new();

        for endpoint in &self.endpoints {
            let outcome = self.checker.check(endpoint).await;
            summary.checked += 1;

            // Prior state decides whether a success is a recovery
            let prior_outage = store.is_down(&endpoint.name, self.clock.now());

            store.update(
                &endpoint.name,
                outcome.success,
                outcome.error.clone(),
                self.clock.now(),
            );

            if !outcome.success {
                summary
                    .failures
                    .push((endpoint.name.clone(), outcome.error.clone()));

                let Some(record) = store.get(&endpoint.name) else {
                    continue;
                };

                match should_send_alert_with_ceiling(
                    record,
                    self.clock.now(),
                    self.realert_ceiling_secs,
                ) {
                    AlertDecision::Send { reason } => {
                        debug!(endpoint = %endpoint.name, reason = %reason, "Alert queued");
                        alerts.push(PendingAlert {
                            endpoint: endpoint.clone(),
                            error: outcome.error,
                            reason,
                        });
                    }
                    AlertDecision::Suppress { remaining_secs } => {
                        info!(
                            endpoint = %endpoint.name,
                            remaining_secs = remaining_secs.round(),
                            "Waiting before sending next alert"
                        );
                        summary.alerts_suppressed += 1;
                    }
                }
            } else if let Some(outage_minutes) = prior_outage {
                debug!(endpoint = %endpoint.name, outage_minutes, "Recovery queued");
                recoveries.push(PendingRecovery {
                    endpoint: endpoint.clone(),
                    outage_minutes,
                });
            }
        }

        for alert in &alerts {
            let result = self.notifier.send(&alert.message()).await;
            if result.success {
                store.record_alert_sent(&alert.endpoint.name, self.clock.now());
                summary.alerts_sent += 1;
            } else {
                warn!(
                    endpoint = %alert.endpoint.name,
                    error = ?result.error,
                    "Failed to send alert"
                );
                summary.alerts_failed += 1;
            }
        }

        for recovery in &recoveries {
            let result = self.notifier.send(&recovery.message()).await;
            if result.success {
                summary.recoveries_sent += 1;
            } else {
                warn!(
                    endpoint = %recovery.endpoint.name,
                    error = ?result.error,
                    "Failed to send recovery notice"
                );
                summary.recoveries_failed += 1;
            }
        }

        info!(
            checked = summary.checked,
            failing = summary.failures.len(),
            alerts_sent = summary.alerts_sent,
            alerts_failed = summary.alerts_failed,
            alerts_suppressed = summary.alerts_suppressed,
            recoveries_sent = summary.recoveries_sent,
            recoveries_failed = summary.recoveries_failed,
            "Monitoring run complete"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::NotificationResult;
    use crate::checker::CheckOutcome;
    use crate::models::Timestamp;
    use async_trait::async_trait;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Checker returning scripted outcomes per endpoint name
    #[derive(Clone, Default)]
    struct ScriptedChecker {
        outcomes: Arc<Mutex<HashMap<String, CheckOutcome>>>,
    }

    impl ScriptedChecker {
        fn set(&self, name: &str, outcome: CheckOutcome) {
            self.outcomes
                .lock()
                .unwrap()
                .insert(name.to_string(), outcome);
        }
    }

    #[async_trait]
    impl Checker for ScriptedChecker {
        async fn check(&self, endpoint: &Endpoint) -> CheckOutcome {
            self.outcomes
                .lock()
                .unwrap()
                .get(&endpoint.name)
                .cloned()
                .unwrap_or_else(CheckOutcome::up)
        }
    }

    /// Notifier recording every message, optionally failing delivery
    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
        failing: Arc<Mutex<bool>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &str) -> NotificationResult {
            let failing = *self.failing.lock().unwrap();
            if !failing {
                self.sent.lock().unwrap().push(message.to_string());
            }
            NotificationResult {
                channel_type: "test".to_string(),
                success: !failing,
                error: failing.then(|| "delivery failed".to_string()),
                sent_at: Utc::now(),
            }
        }
    }

    /// Clock frozen at an adjustable instant
    #[derive(Clone, Default)]
    struct ManualClock {
        now: Arc<Mutex<Timestamp>>,
    }

    impl ManualClock {
        fn set(&self, now: Timestamp) {
            *self.now.lock().unwrap() = now;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            *self.now.lock().unwrap()
        }
    }

    struct Harness {
        checker: ScriptedChecker,
        notifier: RecordingNotifier,
        clock: ManualClock,
        monitor: Monitor<ScriptedChecker, RecordingNotifier, ManualClock>,
        store: StatusStore,
    }

    fn harness(names: &[&str]) -> Harness {
        let checker = ScriptedChecker::default();
        let notifier = RecordingNotifier::default();
        let clock = ManualClock::default();
        let endpoints = names
            .iter()
            .map(|name| Endpoint::new(*name, format!("https://{}.example.org", name.to_lowercase())))
            .collect();
        let monitor = Monitor::new(
            endpoints,
            checker.clone(),
            notifier.clone(),
            clock.clone(),
            3600.0,
        );

        Harness {
            checker,
            notifier,
            clock,
            monitor,
            store: StatusStore::in_memory(),
        }
    }

    impl Harness {
        async fn run_at(&mut self, now: Timestamp) -> RunSummary {
            self.clock.set(now);
            self.monitor.run(&mut self.store).await
        }
    }

    #[tokio::test]
    async fn test_unknown_endpoint_failure_alerts_immediately() {
        let mut h = harness(&["Mathhub"]);
        h.checker.set("Mathhub", CheckOutcome::down("Connection error"));

        let summary = h.run_at(1_000.0).await;

        assert_eq!(summary.alerts_sent, 1);
        assert_eq!(
            summary.failures,
            vec![("Mathhub".to_string(), Some("Connection error".to_string()))]
        );
        assert_eq!(
            h.notifier.messages(),
            vec![
                "🚨 MONITOR ALERT: Mathhub is down with error: Connection error\n  \
                 URL: https://mathhub.example.org\n  \n"
                    .to_string()
            ]
        );

        let record = h.store.get("Mathhub").unwrap();
        assert_eq!(record.last_failure_time, Some(1_000.0));
        assert_eq!(record.last_alert_time, Some(1_000.0));
        assert_eq!(record.current_error.as_deref(), Some("Connection error"));
    }

    #[tokio::test]
    async fn test_healthy_endpoints_stay_quiet() {
        let mut h = harness(&["Mathhub", "LMP"]);

        let summary = h.run_at(10.0).await;
        let summary_again = h.run_at(70.0).await;

        assert_eq!(summary.checked, 2);
        assert_eq!(summary_again.checked, 2);
        assert!(h.notifier.messages().is_empty());
        assert_eq!(h.store.get("LMP").unwrap().last_success_time, Some(70.0));
    }

    #[tokio::test]
    async fn test_backoff_window_then_realert() {
        let mut h = harness(&["ALeA"]);
        h.run_at(-100.0).await;

        h.checker.set("ALeA", CheckOutcome::down("Request timed out"));
        let first = h.run_at(0.0).await;
        assert_eq!(first.alerts_sent, 1);

        let quiet = h.run_at(50.0).await;
        assert_eq!(quiet.alerts_sent, 0);
        assert_eq!(quiet.alerts_suppressed, 1);

        let again = h.run_at(101.0).await;
        assert_eq!(again.alerts_sent, 1);

        let messages = h.notifier.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].ends_with("  Last seen up 3 min ago\n"));
        assert_eq!(h.store.get("ALeA").unwrap().last_alert_time, Some(101.0));
    }

    #[tokio::test]
    async fn test_recovery_notice_uses_prior_outage() {
        let mut h = harness(&["LMP"]);
        h.run_at(0.0).await;

        h.checker.set("LMP", CheckOutcome::down("Expected status 2XX, got 502"));
        h.run_at(60.0).await;
        h.run_at(120.0).await;

        // 10.5 minutes down when the success comes in
        h.checker.set("LMP", CheckOutcome::up());
        let summary = h.run_at(630.0).await;

        assert_eq!(summary.recoveries_sent, 1);
        let messages = h.notifier.messages();
        assert_eq!(
            messages.last().unwrap(),
            "✅ MONITOR RECOVERY: LMP is back up\n  URL: https://lmp.example.org\n  \
             Recovered after about 10 min down\n"
        );

        // Exactly one notice per recovery
        let later = h.run_at(690.0).await;
        assert_eq!(later.recoveries_sent, 0);
        assert!(h.store.is_down("LMP", 690.0).is_none());
    }

    #[tokio::test]
    async fn test_failure_after_recovery_alerts_immediately() {
        let mut h = harness(&["Mathhub"]);
        h.run_at(0.0).await;

        h.checker.set("Mathhub", CheckOutcome::down("Connection error"));
        h.run_at(60.0).await;

        h.checker.set("Mathhub", CheckOutcome::up());
        h.run_at(120.0).await;

        h.checker.set("Mathhub", CheckOutcome::down("Connection error"));
        let summary = h.run_at(125.0).await;

        assert_eq!(summary.alerts_sent, 1);
        assert_eq!(summary.alerts_suppressed, 0);
        // alert, recovery, alert
        assert_eq!(h.notifier.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_delivery_leaves_alert_time_unchanged() {
        let mut h = harness(&["ALeA"]);
        h.notifier.set_failing(true);
        h.checker.set("ALeA", CheckOutcome::down("Connection error"));

        let summary = h.run_at(10.0).await;
        assert_eq!(summary.alerts_failed, 1);
        assert_eq!(summary.alerts_sent, 0);
        assert_eq!(h.store.get("ALeA").unwrap().last_alert_time, None);

        // Next run reconsiders the same alert
        h.notifier.set_failing(false);
        let retry = h.run_at(70.0).await;
        assert_eq!(retry.alerts_sent, 1);
        assert_eq!(h.store.get("ALeA").unwrap().last_alert_time, Some(70.0));
    }

    #[tokio::test]
    async fn test_alerts_dispatched_before_recoveries() {
        let mut h = harness(&["Recovering", "Failing"]);
        h.run_at(0.0).await;
        h.checker.set("Recovering", CheckOutcome::down("Connection error"));
        h.run_at(60.0).await;

        h.checker.set("Recovering", CheckOutcome::up());
        h.checker.set("Failing", CheckOutcome::down("Request timed out"));
        h.run_at(120.0).await;

        let messages = h.notifier.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[1].starts_with("🚨 MONITOR ALERT: Failing"));
        assert!(messages[2].starts_with("✅ MONITOR RECOVERY: Recovering"));
    }

    #[tokio::test]
    async fn test_state_persists_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor-status.json");

        let mut h = harness(&["Mathhub"]);
        h.store = StatusStore::load(&path);
        h.run_at(0.0).await;
        h.checker.set("Mathhub", CheckOutcome::down("Connection error"));
        h.run_at(60.0).await;

        // A fresh process picks up where the last one stopped
        h.store = StatusStore::load(&path);
        h.checker.set("Mathhub", CheckOutcome::up());
        let summary = h.run_at(180.0).await;

        assert_eq!(summary.recoveries_sent, 1);
        assert!(h
            .notifier
            .messages()
            .last()
            .unwrap()
            .contains("Recovered after about 3 min down"));
    }
}
