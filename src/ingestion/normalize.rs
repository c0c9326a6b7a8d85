//! Turns raw feed payloads into [`DetectionEvent`]s.
//!
//! Nothing here fails loudly: malformed payloads are logged and dropped so a
//! bad message never takes down a subscriber.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{
    BoundingBox, DetectionEvent, DetectionSource, FeedTarget,
    detection::{CHAT_LABEL_PREFIX, canonical_stream_key},
};

/// Payload of `/api/detection-events`.
#[derive(Debug, Deserialize)]
struct RawDetectionMessage {
    #[serde(default)]
    stream_url: Option<String>,
    #[serde(default)]
    detections: Vec<RawDetection>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default, rename = "box")]
    bbox: Option<[f64; 4]>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

/// Payload of `/api/notification-events`.
#[derive(Debug, Deserialize)]
struct RawNotificationMessage {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    stream: Option<String>,
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    id: Option<Value>,
}

fn classify(class: &str, source: Option<&str>) -> DetectionSource {
    if class.trim_start().starts_with(CHAT_LABEL_PREFIX)
        || source.is_some_and(|s| s.eq_ignore_ascii_case("chat"))
    {
        DetectionSource::Chat
    } else {
        DetectionSource::Ai
    }
}

fn origin_id(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses one detection-feed message into zero or more events.
///
/// Messages carrying an `error`, missing `stream_url`, or failing to parse
/// yield nothing. Individual detections without a `box` are skipped; boxes
/// that are present but malformed are passed through and rejected by the
/// alert store.
pub fn parse_detection_message(raw: &str, received_at: DateTime<Utc>) -> Vec<DetectionEvent> {
    let message: RawDetectionMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping unparsable detection message.");
            return Vec::new();
        }
    };

    if let Some(error) = message.error {
        tracing::warn!(%error, "Detection feed reported an error.");
        return Vec::new();
    }

    let Some(stream_url) = message.stream_url.filter(|s| !s.trim().is_empty()) else {
        tracing::warn!("Dropping detection message without stream_url.");
        return Vec::new();
    };
    let stream_key = canonical_stream_key(&stream_url);

    message
        .detections
        .into_iter()
        .filter_map(|detection| {
            let Some(bbox) = detection.bbox else {
                tracing::warn!(stream = %stream_key, "Dropping detection without box.");
                return None;
            };
            let class = detection.class.unwrap_or_else(|| "object".to_string());
            let source = classify(&class, detection.source.as_deref());
            Some(DetectionEvent {
                stream_key: stream_key.clone(),
                confidence: match source {
                    DetectionSource::Ai => detection.confidence,
                    DetectionSource::Chat => None,
                },
                object_class: class,
                bounding_box: BoundingBox::from_array(bbox),
                image_url: detection.image_url,
                received_at,
                source,
                origin_id: None,
            })
        })
        .collect()
}

/// Parses one notification-feed message.
///
/// Only `type: "detection"` messages with a `stream` are accepted. The feed
/// has no spatial information, so the event covers the full frame.
pub fn parse_notification_message(raw: &str, received_at: DateTime<Utc>) -> Option<DetectionEvent> {
    let message: RawNotificationMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping unparsable notification message.");
            return None;
        }
    };

    if message.kind.as_deref() != Some("detection") {
        tracing::debug!(kind = ?message.kind, "Ignoring non-detection notification message.");
        return None;
    }

    let Some(stream) = message.stream.filter(|s| !s.trim().is_empty()) else {
        tracing::warn!("Dropping notification message without stream.");
        return None;
    };

    let class = message.object.unwrap_or_else(|| "object".to_string());
    let source = classify(&class, None);
    Some(DetectionEvent {
        stream_key: canonical_stream_key(&stream),
        confidence: match source {
            DetectionSource::Ai => message.confidence,
            DetectionSource::Chat => None,
        },
        object_class: class,
        bounding_box: BoundingBox::FULL_FRAME,
        image_url: message.image_url,
        received_at,
        source,
        origin_id: origin_id(message.id),
    })
}

/// Dispatches to the parser matching `target`.
pub fn normalize(target: FeedTarget, raw: &str, received_at: DateTime<Utc>) -> Vec<DetectionEvent> {
    match target {
        FeedTarget::Detections => parse_detection_message(raw, received_at),
        FeedTarget::Notifications => {
            parse_notification_message(raw, received_at).into_iter().collect()
        }
    }
}
