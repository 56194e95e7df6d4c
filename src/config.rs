use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{LogwardenError, Result};

/// Detection engine configuration.
///
/// One immutable value passed in at engine construction; thresholds are never
/// defaulted or adjusted after the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sliding window duration in seconds, shared by all detectors
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Failed auth attempts within the window to trigger a brute force alert
    #[serde(default = "default_brute_threshold")]
    pub brute_threshold: usize,

    /// Unique destination ports per (src, dst) pair to trigger a vertical scan alert
    #[serde(default = "default_vert_ports")]
    pub vert_ports_threshold: usize,

    /// Unique destination hosts per (src, port) pair to trigger a horizontal scan alert
    #[serde(default = "default_horz_hosts")]
    pub horz_hosts_threshold: usize,

    /// SYN-without-ACK packets per (src, dst) pair to trigger a SYN flood alert
    #[serde(default = "default_syn_burst")]
    pub syn_burst_threshold: usize,
}

fn default_window_secs() -> u64 {
    60
}

fn default_brute_threshold() -> usize {
    5
}

fn default_vert_ports() -> usize {
    10
}

fn default_horz_hosts() -> usize {
    10
}

fn default_syn_burst() -> usize {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            brute_threshold: default_brute_threshold(),
            vert_ports_threshold: default_vert_ports(),
            horz_hosts_threshold: default_horz_hosts(),
            syn_burst_threshold: default_syn_burst(),
        }
    }
}

impl EngineConfig {
    /// Enforce the lower bounds for every threshold.
    ///
    /// Scan and flood thresholds have floors because low values turn ordinary
    /// traffic into alert storms.
    pub fn validate(&self) -> Result<()> {
        if self.window_secs < 1 {
            return Err(LogwardenError::Config(
                "window must be at least 1 second".into(),
            ));
        }
        if self.brute_threshold < 1 {
            return Err(LogwardenError::Config(
                "brute force threshold must be at least 1".into(),
            ));
        }
        if self.vert_ports_threshold < 5 {
            return Err(LogwardenError::Config(
                "vertical scan port threshold must be at least 5".into(),
            ));
        }
        if self.horz_hosts_threshold < 5 {
            return Err(LogwardenError::Config(
                "horizontal scan host threshold must be at least 5".into(),
            ));
        }
        if self.syn_burst_threshold < 10 {
            return Err(LogwardenError::Config(
                "SYN burst threshold must be at least 10".into(),
            ));
        }
        Ok(())
    }

    /// Window as a chrono duration for timestamp arithmetic.
    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_secs as i64)
    }
}
