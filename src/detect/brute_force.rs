//! Brute force login detection
//!
//! Counts failed-authentication occurrences per source address in a sliding
//! window. The latch auto-resets: once the in-window count drops back below
//! the threshold the address re-arms and can alert again on a later burst.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{Alert, AuthEvent, AuthEventKind};

use super::latch::{AlertLatch, ResetPolicy};
use super::summary::SummaryAggregator;
use super::window::SlidingWindow;

struct AddressState {
    window: SlidingWindow<DateTime<Utc>>,
    latch: AlertLatch,
}

impl AddressState {
    fn new() -> Self {
        Self {
            window: SlidingWindow::new(),
            latch: AlertLatch::new(ResetPolicy::AutoReset),
        }
    }
}

/// Per-address failed-login tracker.
pub struct BruteForceDetector {
    window: Duration,
    window_secs: u64,
    threshold: usize,
    state: HashMap<String, AddressState>,
}

impl BruteForceDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window: config.window(),
            window_secs: config.window_secs,
            threshold: config.brute_threshold,
            state: HashMap::new(),
        }
    }

    /// Feed one auth event. Successful logins are recognized but inert, and
    /// an event without a timestamp or without addresses updates nothing.
    pub fn process(&mut self, event: &AuthEvent, summary: &mut SummaryAggregator) -> Vec<Alert> {
        if event.kind == AuthEventKind::LoginSuccess {
            return Vec::new();
        }
        let timestamp = match event.timestamp {
            Some(ts) => ts,
            None => return Vec::new(),
        };
        if event.addresses.is_empty() {
            return Vec::new();
        }

        let mut alerts = Vec::new();

        // Each address occurrence counts independently, duplicates included.
        for address in &event.addresses {
            summary.record_failure(address, timestamp);

            let state = self
                .state
                .entry(address.clone())
                .or_insert_with(AddressState::new);
            state.window.record(timestamp, timestamp, self.window);

            let count = state.window.count();
            if state.latch.observe(count >= self.threshold) {
                debug!(address = %address, count, "brute force threshold crossed");
                summary.record_alarm(address, timestamp);
                alerts.push(Alert::BruteForce {
                    address: address.clone(),
                    count,
                    threshold: self.threshold,
                    window_secs: self.window_secs,
                });
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn failure(secs: i64, addr: &str) -> AuthEvent {
        AuthEvent {
            timestamp: Some(ts(secs)),
            kind: AuthEventKind::LoginFailure,
            addresses: vec![addr.to_string()],
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            window_secs: 60,
            brute_threshold: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_alert_fires_at_threshold() {
        let mut detector = BruteForceDetector::new(&config());
        let mut summary = SummaryAggregator::new();

        assert!(detector.process(&failure(0, "10.0.0.5"), &mut summary).is_empty());
        assert!(detector.process(&failure(5, "10.0.0.5"), &mut summary).is_empty());
        let alerts = detector.process(&failure(10, "10.0.0.5"), &mut summary);
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0],
            Alert::BruteForce {
                address: "10.0.0.5".to_string(),
                count: 3,
                threshold: 3,
                window_secs: 60,
            }
        );
        assert_eq!(summary.get("10.0.0.5").unwrap().alarms, 1);
        assert_eq!(summary.get("10.0.0.5").unwrap().failures, 3);
    }

    #[test]
    fn test_hysteresis_clears_then_refires() {
        let mut detector = BruteForceDetector::new(&config());
        let mut summary = SummaryAggregator::new();

        // t=0,5,10 cross the threshold
        detector.process(&failure(0, "10.0.0.5"), &mut summary);
        detector.process(&failure(5, "10.0.0.5"), &mut summary);
        assert_eq!(detector.process(&failure(10, "10.0.0.5"), &mut summary).len(), 1);

        // t=70: t=0 and t=5 expire, count drops to 2, latch clears silently
        assert!(detector.process(&failure(70, "10.0.0.5"), &mut summary).is_empty());

        // t=75: t=10 expires too, window holds 70 and 75 -> still below
        assert!(detector.process(&failure(75, "10.0.0.5"), &mut summary).is_empty());

        // t=80: 70,75,80 in window, second crossing fires again
        let alerts = detector.process(&failure(80, "10.0.0.5"), &mut summary);
        assert_eq!(alerts.len(), 1);
        assert_eq!(summary.get("10.0.0.5").unwrap().alarms, 2);
    }

    #[test]
    fn test_no_repeat_alert_while_latched() {
        let mut detector = BruteForceDetector::new(&config());
        let mut summary = SummaryAggregator::new();

        for t in [0, 2, 4] {
            detector.process(&failure(t, "10.0.0.5"), &mut summary);
        }
        // Still above threshold, latch holds
        assert!(detector.process(&failure(6, "10.0.0.5"), &mut summary).is_empty());
        assert_eq!(summary.get("10.0.0.5").unwrap().alarms, 1);
    }

    #[test]
    fn test_success_is_inert() {
        let mut detector = BruteForceDetector::new(&config());
        let mut summary = SummaryAggregator::new();
        let event = AuthEvent {
            timestamp: Some(ts(0)),
            kind: AuthEventKind::LoginSuccess,
            addresses: vec!["10.0.0.5".to_string()],
        };
        assert!(detector.process(&event, &mut summary).is_empty());
        assert!(summary.get("10.0.0.5").is_none());
    }

    #[test]
    fn test_missing_timestamp_is_inert() {
        let mut detector = BruteForceDetector::new(&config());
        let mut summary = SummaryAggregator::new();
        let event = AuthEvent {
            timestamp: None,
            kind: AuthEventKind::LoginFailure,
            addresses: vec!["10.0.0.5".to_string()],
        };
        assert!(detector.process(&event, &mut summary).is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_empty_address_list_is_inert() {
        let mut detector = BruteForceDetector::new(&config());
        let mut summary = SummaryAggregator::new();
        let event = AuthEvent {
            timestamp: Some(ts(0)),
            kind: AuthEventKind::InvalidUser,
            addresses: Vec::new(),
        };
        assert!(detector.process(&event, &mut summary).is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_duplicate_address_counts_per_occurrence() {
        let mut detector = BruteForceDetector::new(&config());
        let mut summary = SummaryAggregator::new();
        let event = AuthEvent {
            timestamp: Some(ts(0)),
            kind: AuthEventKind::LoginFailure,
            addresses: vec!["10.0.0.5".to_string(), "10.0.0.5".to_string()],
        };
        detector.process(&event, &mut summary);
        assert_eq!(summary.get("10.0.0.5").unwrap().failures, 2);

        // Third occurrence crosses the threshold
        let alerts = detector.process(&failure(1, "10.0.0.5"), &mut summary);
        assert_eq!(alerts.len(), 1);
    }
}
