//! A shared pool of HTTP clients keyed by retry policy.
//!
//! The REST collaborators, the event feeds and every webhook sink ask the pool
//! for a client. Callers with the same `HttpRetryConfig` share one client and
//! therefore one connection pool.

use std::{collections::HashMap, sync::Arc};

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use tokio::sync::RwLock;

use super::client::{build_base_client, create_retryable_http_client};
use crate::config::{BaseHttpClientConfig, HttpRetryConfig};

/// Errors that can occur within the `HttpClientPool`.
#[derive(Debug, Error)]
pub enum HttpClientPoolError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    HttpClientBuildError(String),
}

/// A pool for managing and reusing HTTP clients.
pub struct HttpClientPool {
    base_config: BaseHttpClientConfig,
    clients: Arc<RwLock<HashMap<HttpRetryConfig, Arc<ClientWithMiddleware>>>>,
}

impl HttpClientPool {
    /// Creates a new, empty pool whose clients use `base_config`.
    pub fn new(base_config: BaseHttpClientConfig) -> Self {
        Self { base_config, clients: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Gets the client for `retry_policy`, creating it on first use.
    ///
    /// Uses double-checked locking so concurrent callers with the same policy
    /// end up with the same client.
    pub async fn get_or_create(
        &self,
        retry_policy: &HttpRetryConfig,
    ) -> Result<Arc<ClientWithMiddleware>, HttpClientPoolError> {
        if let Some(client) = self.clients.read().await.get(retry_policy) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        if let Some(client) = clients.get(retry_policy) {
            return Ok(client.clone());
        }

        let base_client = build_base_client(&self.base_config)
            .map_err(|e| HttpClientPoolError::HttpClientBuildError(e.to_string()))?;

        let new_client = Arc::new(create_retryable_http_client(retry_policy, base_client));
        clients.insert(retry_policy.clone(), new_client.clone());
        tracing::debug!(pool_size = clients.len(), "Created HTTP client for new retry policy.");

        Ok(new_client)
    }

    /// Returns the number of clients in the pool.
    pub async fn active_client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for HttpClientPool {
    fn default() -> Self {
        Self::new(BaseHttpClientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_returns_same_client_for_same_policy() {
        let pool = HttpClientPool::default();
        let retry_config = HttpRetryConfig::default();

        let client1 = pool.get_or_create(&retry_config).await.unwrap();
        let client2 = pool.get_or_create(&retry_config).await.unwrap();

        assert!(Arc::ptr_eq(&client1, &client2));
        assert_eq!(pool.active_client_count().await, 1);
    }

    #[tokio::test]
    async fn test_pool_separates_retry_policies() {
        let pool = HttpClientPool::default();
        let feed_policy = HttpRetryConfig::default();
        let webhook_policy = HttpRetryConfig { max_retries: 5, ..Default::default() };

        let feed_client = pool.get_or_create(&feed_policy).await.unwrap();
        let webhook_client = pool.get_or_create(&webhook_policy).await.unwrap();

        assert!(!Arc::ptr_eq(&feed_client, &webhook_client));
        assert_eq!(pool.active_client_count().await, 2);
    }

    #[tokio::test]
    async fn test_pool_concurrent_access() {
        let pool = Arc::new(HttpClientPool::default());
        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move { pool.get_or_create(&HttpRetryConfig::default()).await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert!(result.unwrap().is_ok());
        }
        assert_eq!(pool.active_client_count().await, 1);
    }
}
