//! SYN flood detection
//!
//! Counts TCP SYN-without-ACK packets per (src, dst) pair in the sliding
//! window. Presence alone counts; there is no payload. The latch is
//! one-shot for the run, like the scan detectors.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{Alert, FirewallEvent, Protocol};

use super::latch::{AlertLatch, ResetPolicy};
use super::summary::SummaryAggregator;
use super::window::SlidingWindow;

struct PairState {
    window: SlidingWindow<()>,
    latch: AlertLatch,
}

impl PairState {
    fn new() -> Self {
        Self {
            window: SlidingWindow::new(),
            latch: AlertLatch::new(ResetPolicy::OneShot),
        }
    }
}

/// Per-(src, dst) SYN burst tracker.
pub struct SynFloodDetector {
    window: Duration,
    window_secs: u64,
    threshold: usize,
    state: HashMap<(String, String), PairState>,
}

impl SynFloodDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window: config.window(),
            window_secs: config.window_secs,
            threshold: config.syn_burst_threshold,
            state: HashMap::new(),
        }
    }

    /// Feed one firewall event whose source already passed normalization.
    /// Only TCP with SYN set and ACK clear participates.
    pub fn process(
        &mut self,
        src: &str,
        timestamp: DateTime<Utc>,
        event: &FirewallEvent,
        summary: &mut SummaryAggregator,
    ) -> Option<Alert> {
        if event.protocol != Some(Protocol::Tcp) || !event.syn || event.ack {
            return None;
        }
        let dst = event.dst.as_deref()?;

        let state = self
            .state
            .entry((src.to_string(), dst.to_string()))
            .or_insert_with(PairState::new);
        state.window.record(timestamp, (), self.window);

        let count = state.window.count();
        if !state.latch.observe(count >= self.threshold) {
            return None;
        }
        debug!(src, dst, count, "SYN burst threshold crossed");
        summary.record_alarm(src, timestamp);
        Some(Alert::SynFlood {
            src: src.to_string(),
            dst: dst.to_string(),
            count,
            threshold: self.threshold,
            window_secs: self.window_secs,
        })
    }
}
