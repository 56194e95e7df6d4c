//! logwarden — log-driven attack pattern detection
//!
//! Reads security-relevant log lines (sshd auth logs, nftables/iptables
//! kernel firewall logs), classifies them into structured events, and runs
//! them through a stateful detection engine that recognizes:
//! - credential brute forcing (per-address failed-login bursts)
//! - vertical port scans (one source, many ports on one destination)
//! - horizontal port scans (one source, one port across many destinations)
//! - SYN floods (SYN-without-ACK bursts per source/destination pair)
//!
//! Detection is built on per-key sliding time windows with explicit
//! threshold/latch policies, plus per-key summary statistics for the whole
//! run. Processing is synchronous and single-pass; one engine instance owns
//! all state for one run.

pub mod classifier;
pub mod config;
pub mod detect;
pub mod error;
pub mod models;

pub use classifier::LineClassifier;
pub use config::EngineConfig;
pub use detect::DetectionEngine;
pub use error::{LogwardenError, Result};
pub use models::{Alert, ParsedEvent, SummaryEntry};
