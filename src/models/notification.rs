//! Data models for session notifications and transient toasts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PlatformKind;

/// Stable identifier of a notification within a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What produced a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A flagged object detected in the video.
    Detection,
    /// A flagged keyword in the chat.
    Chat,
}

/// Enrichment shown next to a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NotificationDetails {
    /// Backend id of the stream, if the dashboard knows it.
    pub stream_id: Option<i64>,
    /// Agent assigned to the stream, or "Unassigned".
    pub agent_name: String,
    /// Streamer username.
    pub streamer_name: String,
    /// Platform hosting the stream.
    pub platform: Option<PlatformKind>,
    /// Confidence in percent, one decimal. `None` for chat matches.
    pub confidence_percent: Option<f64>,
}

/// A notification kept for the whole operator session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    /// Unique, monotonic id.
    pub id: NotificationId,
    /// Human-readable summary.
    pub message: String,
    /// Client receipt time of the originating event.
    pub timestamp: DateTime<Utc>,
    /// Whether the operator has seen it.
    #[serde(default)]
    pub read: bool,
    /// Notification category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Annotated snapshot or stream thumbnail.
    pub image_url: Option<String>,
    /// Canonical key of the stream the alert concerns.
    pub stream_key: String,
    /// Enrichment from the dashboard.
    pub details: NotificationDetails,
}

/// Filters accepted by `NotificationAggregator::list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationFilter {
    /// Every notification.
    #[default]
    All,
    /// Only unread notifications.
    Unread,
    /// Only object-detection notifications.
    Detection,
}

impl NotificationFilter {
    /// Returns whether `notification` passes the filter.
    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            NotificationFilter::All => true,
            NotificationFilter::Unread => !notification.read,
            NotificationFilter::Detection => notification.kind == NotificationKind::Detection,
        }
    }
}

/// A transient, user-facing alert (toast or OS notification).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Toast {
    /// Short title, e.g. "Object Detected".
    pub title: String,
    /// The notification the toast announces.
    pub notification: Notification,
}
