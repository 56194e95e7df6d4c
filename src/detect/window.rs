//! Sliding time window primitive
//!
//! Ordered buffer of `(timestamp, payload)` entries for a single key with
//! front-eviction expiry. Timestamps within one key's stream are expected to
//! be non-decreasing, which makes pruning amortized O(1) per event.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

/// Per-key ordered buffer with window-based expiry.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow<P> {
    entries: VecDeque<(DateTime<Utc>, P)>,
}

impl<P> SlidingWindow<P> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append an entry, then evict from the front everything older than
    /// `window` relative to the appended timestamp.
    ///
    /// Pruning anchors to the most recently appended timestamp, so an
    /// out-of-order append (older than entries already buffered) can
    /// transiently retain stale entries until a newer timestamp arrives.
    /// That is the observed behavior of the system, kept as-is.
    pub fn record(&mut self, timestamp: DateTime<Utc>, payload: P, window: Duration) {
        self.entries.push_back((timestamp, payload));
        while let Some((front, _)) = self.entries.front() {
            if timestamp - *front > window {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of retained entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamps of the retained entries, oldest first.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.entries.iter().map(|(ts, _)| *ts)
    }
}

impl<P: Eq + Hash> SlidingWindow<P> {
    /// Set cardinality over the retained payloads.
    pub fn unique_payloads(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, p)| p)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_entries_within_window_retained() {
        let mut window = SlidingWindow::new();
        let span = Duration::seconds(60);
        window.record(ts(0), (), span);
        window.record(ts(30), (), span);
        window.record(ts(60), (), span);
        assert_eq!(window.count(), 3);
    }

    #[test]
    fn test_old_entries_evicted_from_front() {
        let mut window = SlidingWindow::new();
        let span = Duration::seconds(60);
        window.record(ts(0), (), span);
        window.record(ts(30), (), span);
        window.record(ts(100), (), span);
        // t=0 is 100s old, t=30 is 70s old; both out of the 60s window
        assert_eq!(window.count(), 1);
    }

    #[test]
    fn test_window_invariant_after_each_record() {
        let mut window = SlidingWindow::new();
        let span = Duration::seconds(10);
        for t in [0, 3, 9, 12, 14, 40, 41] {
            window.record(ts(t), (), span);
            let newest = ts(t);
            assert!(window.timestamps().all(|e| newest - e <= span));
        }
    }

    #[test]
    fn test_out_of_order_append_retains_stale_entries() {
        let mut window = SlidingWindow::new();
        let span = Duration::seconds(60);
        window.record(ts(0), (), span);
        window.record(ts(100), (), span);
        assert_eq!(window.count(), 1);
        // Older-than-buffered timestamp still appends; pruning against the
        // stale "now" keeps everything.
        window.record(ts(10), (), span);
        assert_eq!(window.count(), 2);
    }

    #[test]
    fn test_unique_payloads() {
        let mut window = SlidingWindow::new();
        let span = Duration::seconds(60);
        window.record(ts(0), 22u16, span);
        window.record(ts(1), 80u16, span);
        window.record(ts(2), 22u16, span);
        assert_eq!(window.count(), 3);
        assert_eq!(window.unique_payloads(), 2);
    }

    #[test]
    fn test_eviction_drops_unique_payloads() {
        let mut window = SlidingWindow::new();
        let span = Duration::seconds(60);
        window.record(ts(0), 22u16, span);
        window.record(ts(120), 80u16, span);
        assert_eq!(window.unique_payloads(), 1);
    }
}
