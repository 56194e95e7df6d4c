use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::{debug, info};

use logwarden::config::EngineConfig;
use logwarden::models::SummaryEntry;
use logwarden::{DetectionEngine, LineClassifier};

#[derive(Parser)]
#[command(name = "logwarden")]
#[command(author, version, about = "Log-driven attack pattern detector")]
pub struct Cli {
    /// Log file to analyze (sshd auth log and/or kernel firewall log)
    pub logfile: PathBuf,

    /// Sliding window duration in seconds
    #[arg(long = "window", value_name = "SECS", default_value_t = 60)]
    pub window: u64,

    /// Failed auth attempts within the window before a brute force alert
    #[arg(long = "brute-threshold", value_name = "N", default_value_t = 5)]
    pub brute_threshold: usize,

    /// Unique destination ports per source/destination pair before a vertical scan alert
    #[arg(long = "vert-ports", value_name = "N", default_value_t = 10)]
    pub vert_ports: usize,

    /// Unique destination hosts per source/port pair before a horizontal scan alert
    #[arg(long = "horz-hosts", value_name = "N", default_value_t = 10)]
    pub horz_hosts: usize,

    /// SYN-without-ACK packets per source/destination pair before a SYN flood alert
    #[arg(long = "syn-burst", value_name = "N", default_value_t = 20)]
    pub syn_burst: usize,

    /// Emit alerts and summary records as newline-delimited JSON
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

/// Summary table row for terminal output.
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Failures")]
    failures: u64,
    #[tabled(rename = "Alarms")]
    alarms: u64,
    #[tabled(rename = "Flagged")]
    flagged: &'static str,
    #[tabled(rename = "First Seen")]
    first_seen: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl SummaryRow {
    fn new(address: &str, entry: &SummaryEntry) -> Self {
        let fmt_ts = |ts: Option<chrono::DateTime<chrono::Utc>>| {
            ts.map(|t| t.format("%b %e %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        Self {
            address: address.to_string(),
            failures: entry.failures,
            alarms: entry.alarms,
            flagged: if entry.flagged { "yes" } else { "no" },
            first_seen: fmt_ts(entry.first_seen),
            last_seen: fmt_ts(entry.last_seen),
        }
    }
}

/// Read the log file line by line, classify, and drive the engine.
pub fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig {
        window_secs: cli.window,
        brute_threshold: cli.brute_threshold,
        vert_ports_threshold: cli.vert_ports,
        horz_hosts_threshold: cli.horz_hosts,
        syn_burst_threshold: cli.syn_burst,
    };
    let mut engine = DetectionEngine::new(config).context("invalid detection thresholds")?;
    let classifier = LineClassifier::new().context("failed to compile log patterns")?;

    let file = File::open(&cli.logfile)
        .with_context(|| format!("cannot open log file {}", cli.logfile.display()))?;
    let reader = BufReader::new(file);

    let mut lines_total = 0u64;
    let mut lines_classified = 0u64;
    let mut alerts_total = 0u64;

    for line in reader.lines() {
        let line = line.context("failed to read log line")?;
        lines_total += 1;

        let event = match classifier.classify(&line) {
            Some(event) => event,
            None => continue,
        };
        lines_classified += 1;

        for alert in engine.process(&event) {
            alerts_total += 1;
            if cli.json {
                println!("{}", serde_json::to_string(&alert)?);
            } else {
                println!("{} {}", "[ALERT]".red().bold(), alert);
            }
        }
    }

    debug!(lines_total, lines_classified, "finished reading log");
    info!(
        "processed {} lines ({} classified), {} alerts",
        lines_total, lines_classified, alerts_total
    );

    print_summary(&engine, cli.json)?;
    Ok(())
}

fn print_summary(engine: &DetectionEngine, json: bool) -> Result<()> {
    if json {
        for (address, entry) in engine.summary() {
            let mut record = serde_json::to_value(entry)?;
            record["address"] = serde_json::Value::String(address.to_string());
            println!("{}", serde_json::to_string(&record)?);
        }
        return Ok(());
    }

    let rows: Vec<SummaryRow> = engine
        .summary()
        .map(|(address, entry)| SummaryRow::new(address, entry))
        .collect();

    if rows.is_empty() {
        println!("\nNo security-relevant activity observed.");
        return Ok(());
    }

    println!("\n{}", "Per-address summary:".bold());
    println!("{}", Table::new(rows));
    Ok(())
}
