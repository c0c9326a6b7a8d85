//! This module defines the configuration of toast destinations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::HttpRetryConfig;

/// Configuration for a generic webhook sink.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct WebhookSinkConfig {
    /// The URL of the webhook endpoint.
    pub url: Url,
    /// Optional custom headers to include in the request.
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    /// The retry policy configuration for HTTP requests.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

/// Configuration for the stdout sink.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct StdoutSinkConfig {
    /// Print the full toast as JSON instead of a short banner.
    #[serde(default)]
    pub json: bool,
}

/// The type of sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertSinkConfig {
    /// Print toasts to standard output.
    Stdout(StdoutSinkConfig),
    /// POST toasts to a webhook.
    Webhook(WebhookSinkConfig),
}

impl AlertSinkConfig {
    /// A short name used in logs and delivery counters.
    pub fn name(&self) -> String {
        match self {
            AlertSinkConfig::Stdout(_) => "stdout".to_string(),
            AlertSinkConfig::Webhook(config) => format!("webhook:{}", config.url),
        }
    }
}
