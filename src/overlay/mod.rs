//! # Overlay
//!
//! Draws live detections over a stream's video surface. [`render`] is a pure
//! projection from percent boxes to pixel rectangles; [`OverlaySurface`]
//! owns the mount lifecycle of one surface (feed subscription, store slot,
//! render ticker).

mod renderer;
mod surface;

pub use renderer::{OverlayBox, OverlayStyle, SurfaceSize, label_for, render};
pub use surface::{OverlayFrame, OverlaySurface, SurfaceState};
