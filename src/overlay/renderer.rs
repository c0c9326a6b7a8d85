//! Pure projection of percent boxes onto a pixel surface.

use serde::Serialize;

use crate::models::{DetectionEvent, DetectionSource};

/// Pixel dimensions of the surface an overlay is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl SurfaceSize {
    /// Creates a size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Visual treatment of an overlay box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStyle {
    /// Outlined object detection.
    Detection,
    /// Chat keyword banner.
    ChatBanner,
}

/// A labelled rectangle in surface pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Text drawn with the box.
    pub label: String,
    /// Visual treatment.
    pub style: OverlayStyle,
}

/// Label for an event: `"<class> (<conf>%)"` for detections, the keyword for
/// chat matches.
pub fn label_for(event: &DetectionEvent) -> String {
    match event.source {
        DetectionSource::Chat => event.keyword().unwrap_or(&event.object_class).to_string(),
        DetectionSource::Ai => match event.confidence {
            Some(confidence) => format!("{} ({:.0}%)", event.object_class, confidence * 100.0),
            None => event.object_class.clone(),
        },
    }
}

/// Projects `events` onto `surface`, one box per event in input order.
///
/// A surface with a non-positive or non-finite dimension renders nothing.
/// Events with malformed boxes are skipped.
pub fn render(surface: SurfaceSize, events: &[DetectionEvent]) -> Vec<OverlayBox> {
    if !surface.is_drawable() {
        return Vec::new();
    }
    events
        .iter()
        .filter(|event| event.bounding_box.validate().is_ok())
        .map(|event| {
            let bbox = &event.bounding_box;
            OverlayBox {
                x: surface.width * bbox.left / 100.0,
                y: surface.height * bbox.top / 100.0,
                width: surface.width * bbox.width() / 100.0,
                height: surface.height * bbox.height() / 100.0,
                label: label_for(event),
                style: match event.source {
                    DetectionSource::Ai => OverlayStyle::Detection,
                    DetectionSource::Chat => OverlayStyle::ChatBanner,
                },
            }
        })
        .collect()
}
