//! This module provides the `ConsoleBuilder` for constructing a `Console`.

use std::sync::Arc;

use super::{Console, ConsoleError};
use crate::{
    aggregator::NotificationAggregator,
    api::{ApiClient, BackendApi},
    config::AppConfig,
    http_client::HttpClientPool,
    ingestion::{ChannelHub, EventSource, HttpEventSource},
    sinks::AlertDispatcher,
};

/// A builder for creating a `Console` instance.
///
/// Only the configuration is required. The backend client and the event
/// source default to HTTP implementations pointed at `api_base_url`.
#[derive(Default)]
pub struct ConsoleBuilder {
    config: Option<AppConfig>,
    api: Option<Arc<dyn BackendApi>>,
    event_source: Option<Arc<dyn EventSource>>,
    http_pool: Option<Arc<HttpClientPool>>,
}

impl ConsoleBuilder {
    /// Creates a new, empty `ConsoleBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the backend REST client.
    pub fn api(mut self, api: Arc<dyn BackendApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Overrides the event feed transport.
    pub fn event_source(mut self, event_source: Arc<dyn EventSource>) -> Self {
        self.event_source = Some(event_source);
        self
    }

    /// Shares an existing HTTP client pool.
    pub fn http_pool(mut self, http_pool: Arc<HttpClientPool>) -> Self {
        self.http_pool = Some(http_pool);
        self
    }

    /// Assembles the `Console`, building any component that was not
    /// provided.
    pub async fn build(self) -> Result<Console, ConsoleError> {
        let config = self.config.ok_or(ConsoleError::MissingConfig)?;
        let http_pool = self
            .http_pool
            .unwrap_or_else(|| Arc::new(HttpClientPool::new(config.http_base_config.clone())));

        let api = match self.api {
            Some(api) => api,
            None => {
                let client = http_pool.get_or_create(&config.http_retry_config).await?;
                Arc::new(ApiClient::new(
                    client,
                    config.api_base_url.clone(),
                    config.session_cookie.clone(),
                ))
            }
        };

        let event_source = match self.event_source {
            Some(event_source) => event_source,
            None => {
                // The hub owns feed reconnection.
                let no_retry = crate::config::HttpRetryConfig {
                    max_retries: 0,
                    ..config.http_retry_config.clone()
                };
                let client = http_pool.get_or_create(&no_retry).await?;
                Arc::new(HttpEventSource::new(
                    client,
                    config.api_base_url.clone(),
                    config.session_cookie.clone(),
                ))
            }
        };

        let hub = ChannelHub::new(
            event_source,
            config.reconnect_delay_ms,
            config.subscriber_channel_capacity,
        );
        let aggregator = Arc::new(
            NotificationAggregator::new(config.throttle.clone())
                .with_dedup_policy(config.dedup.clone()),
        );
        let dispatcher = Arc::new(AlertDispatcher::from_config(&config.sinks, &http_pool).await?);
        tracing::info!(
            api_base_url = %config.api_base_url,
            sinks = dispatcher.sink_count(),
            aggregate_feed = %config.aggregate_feed,
            "Console assembled."
        );

        Ok(Console::new(config, api, hub, aggregator, dispatcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_fails_if_config_is_missing() {
        let result = ConsoleBuilder::new().build().await;
        assert!(matches!(result, Err(ConsoleError::MissingConfig)));
    }

    #[tokio::test]
    async fn test_build_with_defaults() {
        let console = ConsoleBuilder::new().config(AppConfig::default()).build().await.unwrap();
        assert_eq!(console.store().stream_count(), 0);
        assert_eq!(console.aggregator().unread_count().await, 0);
    }
}
