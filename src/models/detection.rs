//! Data models for detection events pushed by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label prefix the backend uses for chat-keyword matches.
pub const CHAT_LABEL_PREFIX: &str = "CHAT:";

/// Where a detection came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    /// Object-detection inference on a video frame.
    Ai,
    /// Keyword match in the stream's chat.
    Chat,
}

/// A rectangle in percent-of-frame coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    /// Left edge, percent of frame width.
    pub left: f64,
    /// Top edge, percent of frame height.
    pub top: f64,
    /// Right edge, percent of frame width.
    pub right: f64,
    /// Bottom edge, percent of frame height.
    pub bottom: f64,
}

/// Reasons a bounding box is rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BoundingBoxError {
    /// A coordinate is NaN or infinite.
    #[error("bounding box has a non-finite coordinate")]
    NonFinite,
    /// A coordinate lies outside [0, 100].
    #[error("bounding box coordinate {0} is outside [0, 100]")]
    OutOfRange(f64),
    /// The box has zero or negative width or height.
    #[error("bounding box is empty or inverted")]
    Inverted,
}

impl BoundingBox {
    /// The whole frame.
    pub const FULL_FRAME: BoundingBox =
        BoundingBox { left: 0.0, top: 0.0, right: 100.0, bottom: 100.0 };

    /// Bottom-right banner region used for chat alerts, which have no spatial
    /// location of their own.
    pub const CHAT_BANNER: BoundingBox =
        BoundingBox { left: 60.0, top: 85.0, right: 100.0, bottom: 100.0 };

    /// Builds a box from the backend's `[x1, y1, x2, y2]` array.
    pub fn from_array([left, top, right, bottom]: [f64; 4]) -> Self {
        Self { left, top, right, bottom }
    }

    /// Checks that every coordinate is within [0, 100] and the box is not
    /// empty.
    pub fn validate(&self) -> Result<(), BoundingBoxError> {
        let coords = [self.left, self.top, self.right, self.bottom];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(BoundingBoxError::NonFinite);
        }
        if let Some(c) = coords.iter().find(|c| !(0.0..=100.0).contains(*c)) {
            return Err(BoundingBoxError::OutOfRange(*c));
        }
        if self.right <= self.left || self.bottom <= self.top {
            return Err(BoundingBoxError::Inverted);
        }
        Ok(())
    }

    /// Width in percent.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height in percent.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// A single inference result or chat-keyword match, attributed to a stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionEvent {
    /// Canonical identifier of the stream (its room URL).
    pub stream_key: String,
    /// Detected class, or `CHAT: <keyword>` for chat matches.
    pub object_class: String,
    /// Model confidence in [0, 1]. `None` for chat matches.
    pub confidence: Option<f64>,
    /// Percent-of-frame box.
    pub bounding_box: BoundingBox,
    /// Annotated snapshot, when the backend saved one.
    pub image_url: Option<String>,
    /// Client receipt time. Server timestamps are not trusted.
    pub received_at: DateTime<Utc>,
    /// Origin of the detection.
    pub source: DetectionSource,
    /// Server-side log id, when the feed carries one.
    pub origin_id: Option<String>,
}

impl DetectionEvent {
    /// The chat keyword for chat events, with the `CHAT:` prefix removed.
    pub fn keyword(&self) -> Option<&str> {
        match self.source {
            DetectionSource::Chat => Some(
                self.object_class
                    .strip_prefix(CHAT_LABEL_PREFIX)
                    .unwrap_or(&self.object_class)
                    .trim(),
            ),
            DetectionSource::Ai => None,
        }
    }
}

/// Normalizes a stream identifier so that the detection feed, the
/// notification feed and the dashboard agree on one key.
pub fn canonical_stream_key(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Last path segment of a stream key, used as the streamer name when the
/// dashboard does not know the stream.
pub fn streamer_from_key(stream_key: &str) -> &str {
    stream_key.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(stream_key)
}
