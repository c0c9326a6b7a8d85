//! Offline replay of recorded feed messages.
//!
//! Each line of the input file is one recorded message:
//!
//! ```json
//! {"feed": "detections", "at": "2024-05-01T12:00:00Z", "payload": {"stream_url": "..."}}
//! ```
//!
//! `payload` is either the JSON message itself or the raw string received
//! on the wire. Messages are normalized, recorded in an alert store and fed
//! to a notification aggregator exactly as the live console would, using
//! `at` as the receipt time. The report lists every notification and toast.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    aggregator::NotificationAggregator,
    config::AppConfig,
    ingestion::normalize::normalize,
    models::{
        DedupPolicy, FeedTarget, FlaggedObject, FlaggedObjects, Notification,
        NotificationFilter, ThrottlePolicy, Toast,
    },
    store::AlertStore,
};

/// Errors that abort a replay.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// The recording could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    /// The report could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// A `--flag` value is malformed.
    #[error("Invalid flag '{0}', expected <class> or <class>:<threshold>")]
    InvalidFlag(String),
}

/// Arguments of the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Path to the JSONL recording.
    #[arg(short, long)]
    file: PathBuf,
    /// Flag an object class, optionally with a threshold (`knife:0.6`).
    /// Without any flag, every detection qualifies.
    #[arg(long = "flag")]
    flags: Vec<String>,
    /// Directory holding `app.yaml`. Defaults are used when omitted.
    #[arg(short, long)]
    config_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordedMessage {
    feed: FeedTarget,
    at: DateTime<Utc>,
    payload: serde_json::Value,
}

impl RecordedMessage {
    fn raw(&self) -> String {
        match &self.payload {
            serde_json::Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

/// Replay settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Feed whose events become notifications.
    pub aggregate_feed: FeedTarget,
    /// Toast throttling.
    pub throttle: ThrottlePolicy,
    /// Recognition of redelivered events.
    pub dedup: DedupPolicy,
    /// Alert store TTL.
    pub alert_ttl: std::time::Duration,
    /// Flagged objects. `None` lets every detection qualify.
    pub flagged: Option<Vec<FlaggedObject>>,
}

/// Outcome of a replay.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    /// Recorded messages processed.
    pub messages: usize,
    /// Lines that could not be parsed.
    pub skipped_lines: usize,
    /// Events accepted by the alert store.
    pub recorded_events: usize,
    /// Live alerts per stream at the time of the last message.
    pub active_alerts: BTreeMap<String, usize>,
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Toasts in the order they fired.
    pub toasts: Vec<Toast>,
}

/// Parses `class` or `class:threshold`.
pub fn parse_flag(flag: &str) -> Result<FlaggedObject, ReplayError> {
    let (name, threshold) = match flag.rsplit_once(':') {
        Some((name, threshold)) => {
            let threshold: f64 =
                threshold.trim().parse().map_err(|_| ReplayError::InvalidFlag(flag.to_string()))?;
            (name, threshold)
        }
        None => (flag, 0.8),
    };
    let name = name.trim();
    if name.is_empty() || !(0.0..=1.0).contains(&threshold) {
        return Err(ReplayError::InvalidFlag(flag.to_string()));
    }
    Ok(FlaggedObject { id: None, object_name: name.to_string(), confidence_threshold: threshold })
}

/// Replays every line of `reader`.
pub async fn replay(
    reader: impl BufRead,
    options: ReplayOptions,
) -> Result<ReplayReport, ReplayError> {
    let store = AlertStore::new(options.alert_ttl, std::time::Duration::MAX);
    let aggregator =
        NotificationAggregator::new(options.throttle).with_dedup_policy(options.dedup);
    if let Some(flagged) = options.flagged {
        aggregator.update_flagged_objects(FlaggedObjects::new(flagged)).await;
    }

    let mut report = ReplayReport {
        messages: 0,
        skipped_lines: 0,
        recorded_events: 0,
        active_alerts: BTreeMap::new(),
        notifications: Vec::new(),
        toasts: Vec::new(),
    };
    let mut last_at = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let message: RecordedMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "Skipping unreadable recording line.");
                report.skipped_lines += 1;
                continue;
            }
        };
        report.messages += 1;
        last_at = Some(last_at.map_or(message.at, |last: DateTime<Utc>| last.max(message.at)));

        for event in normalize(message.feed, &message.raw(), message.at) {
            report.active_alerts.entry(event.stream_key.clone()).or_insert(0);
            if message.feed == options.aggregate_feed {
                let alert = aggregator.on_detection_event(&event).await;
                report.toasts.extend(alert.and_then(|alert| alert.toast));
            }
            if message.feed == FeedTarget::Detections && store.record(event) {
                report.recorded_events += 1;
            }
        }
    }

    if let Some(at) = last_at {
        for (stream_key, count) in report.active_alerts.iter_mut() {
            *count = store.active_for(stream_key, at).len();
        }
    }
    report.notifications = aggregator.list(NotificationFilter::All).await;
    Ok(report)
}

/// Runs the `replay` subcommand and prints the JSON report.
pub async fn execute(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config_dir {
        Some(dir) => AppConfig::new(Some(dir))?,
        None => AppConfig::default(),
    };
    let flagged = if args.flags.is_empty() {
        None
    } else {
        Some(args.flags.iter().map(|f| parse_flag(f)).collect::<Result<Vec<_>, _>>()?)
    };

    let options = ReplayOptions {
        aggregate_feed: config.aggregate_feed,
        throttle: config.throttle.clone(),
        dedup: config.dedup.clone(),
        alert_ttl: config.alert_ttl_ms,
        flagged,
    };

    tracing::info!(file = %args.file.display(), "Starting replay...");
    let reader = BufReader::new(File::open(&args.file)?);
    let report = replay(reader, options).await?;
    tracing::info!(
        messages = report.messages,
        notifications = report.notifications.len(),
        toasts = report.toasts.len(),
        "Replay finished."
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
