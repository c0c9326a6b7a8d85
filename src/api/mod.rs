//! # Backend REST collaborators
//!
//! The console only reads from the backend: the session, the stream
//! dashboard and the flagged-object settings. Failures are returned as
//! [`ApiError`] values; callers log them and keep their last known state.

mod client;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub use client::ApiClient;

use crate::models::{
    AgentDashboardResponse, DashboardResponse, FlaggedObject, SessionInfo,
};

/// Errors raised by backend requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint URL could not be built.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request failed before a response arrived.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The session is missing or lacks the required role.
    #[error("Not authorized to call {url} (HTTP {status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Endpoint URL.
        url: String,
    },

    /// The backend answered with another non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Endpoint URL.
        url: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] reqwest::Error),
}

/// The backend endpoints the console reads.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /api/session`. A logged-out session is not an error.
    async fn session(&self) -> Result<SessionInfo, ApiError>;

    /// `GET /api/dashboard` (admin).
    async fn dashboard(&self) -> Result<DashboardResponse, ApiError>;

    /// `GET /api/agent/dashboard` (agent).
    async fn agent_dashboard(&self) -> Result<AgentDashboardResponse, ApiError>;

    /// `GET /api/objects` (admin).
    async fn flagged_objects(&self) -> Result<Vec<FlaggedObject>, ApiError>;
}
