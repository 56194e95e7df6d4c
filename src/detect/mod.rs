//! Stateful multi-signal detection engine
//!
//! One [`DetectionEngine`] instance owns every per-key map (windows, latches,
//! summaries) for its lifetime; nothing is shared across instances or runs.
//! Events are processed synchronously, one at a time, in arrival order:
//!
//! - auth events go to the brute force detector
//! - firewall events pass source normalization, then the port scan and SYN
//!   flood detectors in that order, both always evaluated
//!
//! A single event can return several alerts at once.
//!
//! Per-key state is never evicted, so memory grows with the number of
//! distinct keys observed. A long-running stream deployment would need
//! idle-key eviction on top of this.

pub mod brute_force;
pub mod latch;
pub mod port_scan;
pub mod summary;
pub mod syn_flood;
pub mod window;

use std::net::IpAddr;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::{Alert, ParsedEvent, SummaryEntry};

pub use brute_force::BruteForceDetector;
pub use latch::{AlertLatch, ResetPolicy};
pub use port_scan::PortScanDetector;
pub use summary::SummaryAggregator;
pub use syn_flood::SynFloodDetector;
pub use window::SlidingWindow;

/// Routes classified events to the detectors and collects their alerts.
pub struct DetectionEngine {
    brute_force: BruteForceDetector,
    port_scan: PortScanDetector,
    syn_flood: SynFloodDetector,
    summary: SummaryAggregator,
}

impl DetectionEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            brute_force: BruteForceDetector::new(&config),
            port_scan: PortScanDetector::new(&config),
            syn_flood: SynFloodDetector::new(&config),
            summary: SummaryAggregator::new(),
        })
    }

    /// Process one event to completion. Returns the alerts it produced,
    /// which may be empty, one, or several.
    pub fn process(&mut self, event: &ParsedEvent) -> Vec<Alert> {
        match event {
            ParsedEvent::Auth(auth) => self.brute_force.process(auth, &mut self.summary),
            ParsedEvent::Firewall(fw) => {
                // Source normalization gates everything: an unparseable,
                // loopback, or multicast source drops the whole event before
                // any detector or summary entry sees it.
                let src = match fw.src.as_deref() {
                    Some(src) if !excluded_source(src) => src.to_string(),
                    Some(src) => {
                        debug!(src, "dropping firewall event from excluded source");
                        return Vec::new();
                    }
                    None => return Vec::new(),
                };
                let timestamp = match fw.timestamp {
                    Some(ts) => ts,
                    None => return Vec::new(),
                };

                let mut alerts =
                    self.port_scan
                        .process(&src, timestamp, fw, &mut self.summary);
                alerts.extend(self.syn_flood.process(&src, timestamp, fw, &mut self.summary));
                alerts
            }
        }
    }

    /// Per-key summary records, ordered by key.
    pub fn summary(&self) -> impl Iterator<Item = (&str, &SummaryEntry)> {
        self.summary.entries()
    }

    pub fn summary_entry(&self, key: &str) -> Option<&SummaryEntry> {
        self.summary.get(key)
    }
}

/// A source is excluded when it does not parse as an IP address, or parses
/// as loopback or multicast.
fn excluded_source(src: &str) -> bool {
    match src.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback() || ip.is_multicast(),
        Err(_) => true,
    }
}
