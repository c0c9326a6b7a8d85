//! # Toast sinks
//!
//! Where toasts go once the aggregator lets them through. Every configured
//! sink receives every toast; a failing sink is logged and never blocks the
//! others.

mod dispatcher;
mod stdout;
mod webhook;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub use dispatcher::AlertDispatcher;
pub use stdout::StdoutSink;
pub use webhook::WebhookSink;

use crate::{http_client::HttpClientPoolError, models::Toast};

/// Errors raised while delivering a toast.
#[derive(Debug, Error)]
pub enum AlertSinkError {
    /// The toast could not be serialized.
    #[error("Failed to serialize toast: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request failed.
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The webhook answered with a non-success status.
    #[error("Webhook {url} returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Webhook URL.
        url: String,
    },

    /// A configured header is not a valid HTTP header.
    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    /// No HTTP client could be built for the sink.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpClientPoolError),
}

/// A destination for toasts.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    /// Name used in logs and delivery counters.
    fn name(&self) -> String;

    /// Delivers one toast.
    async fn deliver(&self, toast: &Toast) -> Result<(), AlertSinkError>;
}
