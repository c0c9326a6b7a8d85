use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;

use crate::{
    http_client::HttpClientPool,
    models::{AlertSinkConfig, Toast},
    sinks::{AlertSink, AlertSinkError, StdoutSink, WebhookSink},
};

/// Fans toasts out to every configured sink.
pub struct AlertDispatcher {
    sinks: Vec<Arc<dyn AlertSink>>,
    delivered: DashMap<String, usize>,
}

impl AlertDispatcher {
    /// Creates a dispatcher over already-built sinks.
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        Self { sinks, delivered: DashMap::new() }
    }

    /// Builds every sink in `configs`, taking webhook clients from `pool`.
    pub async fn from_config(
        configs: &[AlertSinkConfig],
        pool: &HttpClientPool,
    ) -> Result<Self, AlertSinkError> {
        let mut sinks: Vec<Arc<dyn AlertSink>> = Vec::with_capacity(configs.len());
        for config in configs {
            match config {
                AlertSinkConfig::Stdout(stdout) => {
                    sinks.push(Arc::new(StdoutSink::new(stdout.clone())));
                }
                AlertSinkConfig::Webhook(webhook) => {
                    let client = pool.get_or_create(&webhook.retry_policy).await?;
                    sinks.push(Arc::new(WebhookSink::new(webhook.clone(), client)?));
                }
            }
            tracing::debug!(sink = %config.name(), "Configured toast sink.");
        }
        Ok(Self::new(sinks))
    }

    /// Delivers `toast` to every sink concurrently. Failures are logged.
    /// Returns the number of sinks that accepted the toast.
    pub async fn dispatch(&self, toast: &Toast) -> usize {
        let results = join_all(self.sinks.iter().map(|sink| async move {
            (sink.name(), sink.deliver(toast).await)
        }))
        .await;

        let mut delivered = 0;
        for (name, result) in results {
            match result {
                Ok(()) => {
                    delivered += 1;
                    *self.delivered.entry(name).or_insert(0) += 1;
                }
                Err(e) => {
                    tracing::error!(
                        sink = %name,
                        notification_id = %toast.notification.id,
                        error = %e,
                        "Failed to deliver toast."
                    );
                }
            }
        }
        delivered
    }

    /// Number of toasts `sink` has accepted.
    pub fn delivered_count(&self, sink: &str) -> usize {
        self.delivered.get(sink).map(|count| *count).unwrap_or(0)
    }

    /// Number of configured sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}
