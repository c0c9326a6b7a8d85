//! # Event ingestion
//!
//! Long-lived subscriptions to the backend's server-sent event feeds.
//!
//! - **`sse`**: incremental `text/event-stream` decoder.
//! - **`normalize`**: raw JSON payloads to [`DetectionEvent`]s. Bad payloads are
//!   logged and dropped.
//! - **`EventSource`**: the transport seam, implemented over HTTP by
//!   [`HttpEventSource`]. A server `retry:` field overrides the configured
//!   reconnect delay for that feed.
//! - **`ChannelHub`**: one shared connection per feed, fanned out to every
//!   subscriber and closed when the last [`Subscription`] is dropped.
//!
//! [`DetectionEvent`]: crate::models::DetectionEvent

mod hub;
pub mod normalize;
mod source;
pub mod sse;

pub use hub::{ChannelHub, Subscription};
pub use source::{EventSource, FeedFrame, HttpEventSource, RawMessageStream};
#[cfg(test)]
pub use source::MockEventSource;
use thiserror::Error;

/// Errors raised while talking to an event feed. They never reach
/// subscribers; the hub logs them and reconnects.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The feed URL could not be built.
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request failed before a response arrived.
    #[error("Feed request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The backend answered with a non-success status.
    #[error("Feed {url} returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Feed URL.
        url: String,
    },

    /// The response body failed mid-stream.
    #[error("Feed body error: {0}")]
    Body(String),

    /// The transport was closed by the other side.
    #[error("Feed closed: {0}")]
    Closed(String),
}
