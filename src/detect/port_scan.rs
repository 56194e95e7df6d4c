//! Port scan detection
//!
//! Two independent views of the same firewall stream:
//! - vertical: one source probing many distinct ports on one destination,
//!   keyed by (src, dst) over unique destination ports
//! - horizontal: one source probing the same port across many destinations,
//!   keyed by (src, port) over unique destination hosts
//!
//! Both latches are one-shot: a pair that crossed its threshold once stays
//! fired for the rest of the run, even if its window later drains.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{Alert, FirewallEvent};

use super::latch::{AlertLatch, ResetPolicy};
use super::summary::SummaryAggregator;
use super::window::SlidingWindow;

struct ScanState<P> {
    window: SlidingWindow<P>,
    latch: AlertLatch,
}

impl<P> ScanState<P> {
    fn new() -> Self {
        Self {
            window: SlidingWindow::new(),
            latch: AlertLatch::new(ResetPolicy::OneShot),
        }
    }
}

/// Vertical and horizontal scan tracker.
pub struct PortScanDetector {
    window: Duration,
    window_secs: u64,
    vert_threshold: usize,
    horz_threshold: usize,
    /// (src, dst) -> unique destination ports probed
    vertical: HashMap<(String, String), ScanState<u16>>,
    /// (src, port) -> unique destination hosts probed
    horizontal: HashMap<(String, u16), ScanState<String>>,
}

impl PortScanDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window: config.window(),
            window_secs: config.window_secs,
            vert_threshold: config.vert_ports_threshold,
            horz_threshold: config.horz_hosts_threshold,
            vertical: HashMap::new(),
            horizontal: HashMap::new(),
        }
    }

    /// Feed one firewall event whose source already passed normalization.
    ///
    /// Vertical and horizontal checks each require their own field set and
    /// run independently; both can fire for the same line. A denied action
    /// counts toward the source's failures regardless of scan state.
    pub fn process(
        &mut self,
        src: &str,
        timestamp: DateTime<Utc>,
        event: &FirewallEvent,
        summary: &mut SummaryAggregator,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if event.action.is_some_and(|a| a.is_denied()) {
            summary.record_failure(src, timestamp);
        }

        if let (Some(dst), Some(port)) = (event.dst.as_deref(), event.dst_port) {
            alerts.extend(self.observe_vertical(src, dst, port, timestamp, summary));
            alerts.extend(self.observe_horizontal(src, dst, port, timestamp, summary));
        }

        alerts
    }

    fn observe_vertical(
        &mut self,
        src: &str,
        dst: &str,
        port: u16,
        timestamp: DateTime<Utc>,
        summary: &mut SummaryAggregator,
    ) -> Option<Alert> {
        let state = self
            .vertical
            .entry((src.to_string(), dst.to_string()))
            .or_insert_with(ScanState::new);
        state.window.record(timestamp, port, self.window);

        let unique_ports = state.window.unique_payloads();
        if !state.latch.observe(unique_ports >= self.vert_threshold) {
            return None;
        }
        debug!(src, dst, unique_ports, "vertical scan threshold crossed");
        summary.record_alarm(src, timestamp);
        Some(Alert::VerticalScan {
            src: src.to_string(),
            dst: dst.to_string(),
            unique_ports,
            threshold: self.vert_threshold,
            window_secs: self.window_secs,
        })
    }

    fn observe_horizontal(
        &mut self,
        src: &str,
        dst: &str,
        port: u16,
        timestamp: DateTime<Utc>,
        summary: &mut SummaryAggregator,
    ) -> Option<Alert> {
        let state = self
            .horizontal
            .entry((src.to_string(), port))
            .or_insert_with(ScanState::new);
        state.window.record(timestamp, dst.to_string(), self.window);

        let unique_hosts = state.window.unique_payloads();
        if !state.latch.observe(unique_hosts >= self.horz_threshold) {
            return None;
        }
        debug!(src, port, unique_hosts, "horizontal scan threshold crossed");
        summary.record_alarm(src, timestamp);
        Some(Alert::HorizontalScan {
            src: src.to_string(),
            port,
            unique_hosts,
            threshold: self.horz_threshold,
            window_secs: self.window_secs,
        })
    }
}
