//! Server-sent event feeds exposed by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A server-push feed the console can subscribe to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeedTarget {
    /// `/api/detection-events`: per-stream detection batches.
    Detections,
    /// `/api/notification-events`: one message per flagged detection.
    Notifications,
}

impl FeedTarget {
    /// Path of the feed relative to the backend base URL.
    pub fn path(self) -> &'static str {
        match self {
            FeedTarget::Detections => "api/detection-events",
            FeedTarget::Notifications => "api/notification-events",
        }
    }
}

impl fmt::Display for FeedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedTarget::Detections => write!(f, "detections"),
            FeedTarget::Notifications => write!(f, "notifications"),
        }
    }
}
