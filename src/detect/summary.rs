//! Per-key summary bookkeeping
//!
//! Passive recipient of increments from the detectors. Entries are created
//! lazily on first observation and never destroyed during a run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::SummaryEntry;

/// Running per-address totals for the whole run.
#[derive(Debug, Default)]
pub struct SummaryAggregator {
    entries: BTreeMap<String, SummaryEntry>,
}

impl SummaryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure occurrence for a key and refresh its seen range.
    pub fn record_failure(&mut self, key: &str, timestamp: DateTime<Utc>) {
        let entry = self.touch(key, timestamp);
        entry.failures += 1;
    }

    /// Record one alert-raising transition for a key. `flagged` latches true
    /// on the first alarm and stays true.
    pub fn record_alarm(&mut self, key: &str, timestamp: DateTime<Utc>) {
        let entry = self.touch(key, timestamp);
        entry.alarms += 1;
        entry.flagged = true;
    }

    fn touch(&mut self, key: &str, timestamp: DateTime<Utc>) -> &mut SummaryEntry {
        let entry = self.entries.entry(key.to_string()).or_default();
        if entry.first_seen.is_none() {
            entry.first_seen = Some(timestamp);
        }
        entry.last_seen = Some(timestamp);
        entry
    }

    pub fn get(&self, key: &str) -> Option<&SummaryEntry> {
        self.entries.get(key)
    }

    /// All entries, ordered by key.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SummaryEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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
    fn test_failures_accumulate() {
        let mut summary = SummaryAggregator::new();
        summary.record_failure("10.0.0.5", ts(0));
        summary.record_failure("10.0.0.5", ts(5));
        let entry = summary.get("10.0.0.5").unwrap();
        assert_eq!(entry.failures, 2);
        assert_eq!(entry.alarms, 0);
        assert!(!entry.flagged);
    }

    #[test]
    fn test_flagged_latches_on_first_alarm() {
        let mut summary = SummaryAggregator::new();
        summary.record_failure("10.0.0.5", ts(0));
        summary.record_alarm("10.0.0.5", ts(1));
        summary.record_failure("10.0.0.5", ts(2));
        let entry = summary.get("10.0.0.5").unwrap();
        assert_eq!(entry.alarms, 1);
        assert!(entry.flagged);
    }

    #[test]
    fn test_seen_range_tracks_first_and_last() {
        let mut summary = SummaryAggregator::new();
        summary.record_failure("10.0.0.5", ts(10));
        summary.record_failure("10.0.0.5", ts(90));
        let entry = summary.get("10.0.0.5").unwrap();
        assert_eq!(entry.first_seen, Some(ts(10)));
        assert_eq!(entry.last_seen, Some(ts(90)));
    }

    #[test]
    fn test_entries_ordered_by_key() {
        let mut summary = SummaryAggregator::new();
        summary.record_failure("192.0.2.2", ts(0));
        summary.record_failure("10.0.0.5", ts(0));
        let keys: Vec<&str> = summary.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["10.0.0.5", "192.0.2.2"]);
    }
}
