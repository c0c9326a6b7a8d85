//! A builder for creating `DetectionEvent` instances in tests.

use chrono::{DateTime, Utc};

use crate::models::{
    BoundingBox, DetectionEvent, DetectionSource, detection::CHAT_LABEL_PREFIX,
};

/// A builder for creating `DetectionEvent` instances in tests.
///
/// Defaults to an AI `person` detection at 90% confidence, received now.
pub struct DetectionEventBuilder {
    stream_key: String,
    object_class: String,
    confidence: Option<f64>,
    bounding_box: BoundingBox,
    image_url: Option<String>,
    received_at: Option<DateTime<Utc>>,
    source: DetectionSource,
    origin_id: Option<String>,
}

impl DetectionEventBuilder {
    /// Creates a new builder for an event on `stream_key`.
    pub fn new(stream_key: &str) -> Self {
        Self {
            stream_key: stream_key.to_string(),
            object_class: "person".to_string(),
            confidence: Some(0.9),
            bounding_box: BoundingBox::from_array([10.0, 10.0, 50.0, 50.0]),
            image_url: None,
            received_at: None,
            source: DetectionSource::Ai,
            origin_id: None,
        }
    }

    /// Sets the detected class.
    pub fn class(mut self, class: &str) -> Self {
        self.object_class = class.to_string();
        self
    }

    /// Sets the confidence.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Turns the event into a chat-keyword match.
    pub fn chat(mut self, keyword: &str) -> Self {
        self.object_class = format!("{CHAT_LABEL_PREFIX} {keyword}");
        self.confidence = None;
        self.source = DetectionSource::Chat;
        self
    }

    /// Sets the box from `[left, top, right, bottom]`.
    pub fn bounding_box(mut self, bbox: [f64; 4]) -> Self {
        self.bounding_box = BoundingBox::from_array(bbox);
        self
    }

    /// Sets the snapshot URL.
    pub fn image_url(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }

    /// Sets the receipt time.
    pub fn received_at(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = Some(at);
        self
    }

    /// Sets the server-side id.
    pub fn origin_id(mut self, id: &str) -> Self {
        self.origin_id = Some(id.to_string());
        self
    }

    /// Builds the `DetectionEvent` instance.
    pub fn build(self) -> DetectionEvent {
        DetectionEvent {
            stream_key: self.stream_key,
            object_class: self.object_class,
            confidence: self.confidence,
            bounding_box: self.bounding_box,
            image_url: self.image_url,
            received_at: self.received_at.unwrap_or_else(Utc::now),
            source: self.source,
            origin_id: self.origin_id,
        }
    }
}
