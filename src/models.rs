use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A log line classified into a structured event.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    Auth(AuthEvent),
    Firewall(FirewallEvent),
}

/// What an authentication log line reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventKind {
    LoginFailure,
    InvalidUser,
    LoginSuccess,
}

impl std::fmt::Display for AuthEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventKind::LoginFailure => write!(f, "failed login"),
            AuthEventKind::InvalidUser => write!(f, "invalid user"),
            AuthEventKind::LoginSuccess => write!(f, "successful login"),
        }
    }
}

/// Structured authentication event.
///
/// A single line may report zero, one, or several addresses; each occurrence
/// is treated as independently observed, duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: AuthEventKind,
    pub addresses: Vec<String>,
}

/// Transport protocol reported by a firewall log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Other(String),
}

impl std::str::FromStr for Protocol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "TCP" => Protocol::Tcp,
            "UDP" => Protocol::Udp,
            "ICMP" => Protocol::Icmp,
            other => Protocol::Other(other.to_string()),
        })
    }
}

/// Verdict tag carried by a firewall log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirewallAction {
    Allow,
    Block,
    Reject,
    Drop,
}

impl FirewallAction {
    /// BLOCK, DROP and REJECT all count as a denied connection attempt.
    pub fn is_denied(self) -> bool {
        !matches!(self, FirewallAction::Allow)
    }
}

impl std::str::FromStr for FirewallAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(FirewallAction::Allow),
            "BLOCK" => Ok(FirewallAction::Block),
            "REJECT" => Ok(FirewallAction::Reject),
            "DROP" => Ok(FirewallAction::Drop),
            other => Err(format!("unknown firewall action: {}", other)),
        }
    }
}

impl std::fmt::Display for FirewallAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FirewallAction::Allow => write!(f, "ALLOW"),
            FirewallAction::Block => write!(f, "BLOCK"),
            FirewallAction::Reject => write!(f, "REJECT"),
            FirewallAction::Drop => write!(f, "DROP"),
        }
    }
}

/// Structured firewall/packet event.
///
/// Not every line carries every field, so everything except the flags is
/// optional; each detector checks the fields it needs and skips otherwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FirewallEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub src: Option<String>,
    pub dst: Option<String>,
    pub protocol: Option<Protocol>,
    pub dst_port: Option<u16>,
    pub action: Option<FirewallAction>,
    pub syn: bool,
    pub ack: bool,
}

/// Alert emitted by the detection engine.
///
/// Each alert carries the triggering key, the count observed at the moment it
/// fired, and the configured threshold and window it was judged against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    BruteForce {
        address: String,
        count: usize,
        threshold: usize,
        window_secs: u64,
    },
    VerticalScan {
        src: String,
        dst: String,
        unique_ports: usize,
        threshold: usize,
        window_secs: u64,
    },
    HorizontalScan {
        src: String,
        port: u16,
        unique_hosts: usize,
        threshold: usize,
        window_secs: u64,
    },
    SynFlood {
        src: String,
        dst: String,
        count: usize,
        threshold: usize,
        window_secs: u64,
    },
}

impl Alert {
    /// Source address the alert is attributed to.
    pub fn source(&self) -> &str {
        match self {
            Alert::BruteForce { address, .. } => address,
            Alert::VerticalScan { src, .. }
            | Alert::HorizontalScan { src, .. }
            | Alert::SynFlood { src, .. } => src,
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::BruteForce {
                address,
                count,
                threshold,
                window_secs,
            } => write!(
                f,
                "brute force: {} failed attempts from {} in {}s (threshold {})",
                count, address, window_secs, threshold
            ),
            Alert::VerticalScan {
                src,
                dst,
                unique_ports,
                threshold,
                window_secs,
            } => write!(
                f,
                "vertical scan: {} probed {} ports on {} in {}s (threshold {})",
                src, unique_ports, dst, window_secs, threshold
            ),
            Alert::HorizontalScan {
                src,
                port,
                unique_hosts,
                threshold,
                window_secs,
            } => write!(
                f,
                "horizontal scan: {} probed port {} on {} hosts in {}s (threshold {})",
                src, port, unique_hosts, window_secs, threshold
            ),
            Alert::SynFlood {
                src,
                dst,
                count,
                threshold,
                window_secs,
            } => write!(
                f,
                "SYN flood: {} SYNs from {} to {} in {}s (threshold {})",
                count, src, dst, window_secs, threshold
            ),
        }
    }
}

/// Per-key running totals kept for the whole run.
///
/// Created lazily on first observation of a key and never destroyed while
/// the engine instance lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryEntry {
    /// Failed auth occurrences plus denied firewall actions
    pub failures: u64,
    /// Alert-raising latch transitions
    pub alarms: u64,
    /// True from the first alarm onward
    pub flagged: bool,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}
