//! Log line classification
//!
//! Turns raw syslog lines into structured [`ParsedEvent`]s for the detection
//! engine:
//! - sshd auth lines (`Failed password`, `Invalid user`, `Accepted password`)
//! - nftables/iptables kernel log lines (`SRC=`/`DST=`/`PROTO=`/`DPT=` tokens
//!   plus a bracketed `[tool ACTION]` tag and standalone SYN/ACK flags)
//!
//! Syslog timestamps carry no year, so the current calendar year is injected
//! at parse time. Lines read across a year boundary are misattributed; the
//! engine does not try to correct this.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::models::{AuthEvent, AuthEventKind, FirewallEvent, ParsedEvent};

/// Compiled patterns for the log formats the engine understands.
pub struct LineClassifier {
    ipv4: Regex,
    fw_src: Regex,
    fw_dst: Regex,
    fw_proto: Regex,
    fw_dpt: Regex,
    fw_action: Regex,
    fw_flag_syn: Regex,
    fw_flag_ack: Regex,
    year: i32,
}

impl LineClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            ipv4: Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b")?,
            fw_src: Regex::new(r"\bSRC=(?P<ip>[\d.]+)")?,
            fw_dst: Regex::new(r"\bDST=(?P<ip>[\d.]+)")?,
            fw_proto: Regex::new(r"\bPROTO=(?P<proto>\w+)")?,
            fw_dpt: Regex::new(r"\bDPT=(?P<port>\d+)")?,
            // Bracketed verdict prefixed by a firewall tool tag,
            // e.g. "[UFW BLOCK]" or "[nftables-input DROP]"
            fw_action: Regex::new(
                r"\[[\w.-]+[ -](?P<action>ALLOW|BLOCK|REJECT|DROP)\]",
            )?,
            fw_flag_syn: Regex::new(r"\bSYN\b")?,
            fw_flag_ack: Regex::new(r"\bACK\b")?,
            year: Utc::now().year(),
        })
    }

    /// Classify one raw line. Lines matching no known pattern return `None`.
    pub fn classify(&self, line: &str) -> Option<ParsedEvent> {
        if self.fw_src.is_match(line) || self.fw_action.is_match(line) {
            return self.classify_firewall(line);
        }
        self.classify_auth(line)
    }

    fn classify_auth(&self, line: &str) -> Option<ParsedEvent> {
        // "Failed password for invalid user x" contains both keywords; the
        // explicit failure wins, matching sshd's own precedence.
        let kind = if line.contains("Failed password") {
            AuthEventKind::LoginFailure
        } else if line.contains("Invalid user") || line.contains("invalid user") {
            AuthEventKind::InvalidUser
        } else if line.contains("Accepted password") || line.contains("Accepted publickey") {
            AuthEventKind::LoginSuccess
        } else {
            return None;
        };

        let addresses: Vec<String> = self
            .ipv4
            .find_iter(line)
            .map(|m| m.as_str().to_string())
            .collect();

        Some(ParsedEvent::Auth(AuthEvent {
            timestamp: self.parse_timestamp(line),
            kind,
            addresses,
        }))
    }

    fn classify_firewall(&self, line: &str) -> Option<ParsedEvent> {
        let capture_ip = |re: &Regex| {
            re.captures(line)
                .and_then(|c| c.name("ip"))
                .map(|m| m.as_str().to_string())
        };

        let dst_port = self
            .fw_dpt
            .captures(line)
            .and_then(|c| c.name("port"))
            .and_then(|m| m.as_str().parse().ok());

        let protocol = self
            .fw_proto
            .captures(line)
            .and_then(|c| c.name("proto"))
            .and_then(|m| m.as_str().parse().ok());

        let action = self
            .fw_action
            .captures(line)
            .and_then(|c| c.name("action"))
            .and_then(|m| m.as_str().parse().ok());

        let event = FirewallEvent {
            timestamp: self.parse_timestamp(line),
            src: capture_ip(&self.fw_src),
            dst: capture_ip(&self.fw_dst),
            protocol,
            dst_port,
            action,
            syn: self.fw_flag_syn.is_match(line),
            ack: self.fw_flag_ack.is_match(line),
        };

        debug!(?event.src, ?event.dst, port = ?event.dst_port, "classified firewall line");
        Some(ParsedEvent::Firewall(event))
    }

    /// Parse the syslog "Mon DD HH:MM:SS" prefix, injecting the current year.
    fn parse_timestamp(&self, line: &str) -> Option<DateTime<Utc>> {
        let prefix = line.get(0..15)?;
        let full = format!("{} {}", self.year, prefix);
        let naive = NaiveDateTime::parse_from_str(&full, "%Y %b %e %H:%M:%S").ok()?;
        Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }
}
