//! This module defines data structures for toast throttling and duplicate
//! suppression.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{deserialize_duration_from_seconds, serialize_duration_to_seconds};

fn default_max_count() -> u32 {
    1
}

fn default_time_window() -> Duration {
    Duration::from_secs(60)
}

/// Policy for throttling toasts to avoid spamming the operator.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// The maximum number of toasts per stream within the time window.
    #[serde(default = "default_max_count")]
    pub max_count: u32,

    /// The time window in seconds for the throttling policy.
    #[serde(
        default = "default_time_window",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub time_window_secs: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self { max_count: default_max_count(), time_window_secs: default_time_window() }
    }
}

fn default_content_window() -> Duration {
    Duration::from_secs(15)
}

fn default_retention() -> Duration {
    Duration::from_secs(60)
}

/// Policy for recognising redelivered detection events.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DedupPolicy {
    /// Events without an origin id that match an earlier event's content
    /// within this window are treated as redeliveries.
    #[serde(
        default = "default_content_window",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub content_window_secs: Duration,

    /// How long a seen key is remembered. Never shorter than the content window.
    #[serde(
        default = "default_retention",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub retention_secs: Duration,
}

impl DedupPolicy {
    /// Age after which a seen key is forgotten.
    pub fn horizon(&self) -> Duration {
        self.retention_secs.max(self.content_window_secs)
    }
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self { content_window_secs: default_content_window(), retention_secs: default_retention() }
    }
}

/// Represents the current throttling state for one stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThrottleState {
    /// The number of toasts sent within the current window.
    pub count: u32,
    /// The timestamp when the current window started.
    pub window_start_time: DateTime<Utc>,
}

impl ThrottleState {
    /// Starts a fresh window at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { count: 0, window_start_time: now }
    }

    /// Records an attempt at `now` and returns whether a toast may fire.
    pub fn admit(&mut self, policy: &ThrottlePolicy, now: DateTime<Utc>) -> bool {
        if now > self.window_start_time + policy.time_window_secs {
            self.count = 0;
            self.window_start_time = now;
        }
        if self.count < policy.max_count {
            self.count += 1;
            true
        } else {
            false
        }
    }
}
