use std::sync::Arc;

use reqwest::Client;
use reqwest_middleware::ClientWithMiddleware;

use crate::{config::HttpRetryConfig, http_client::create_retryable_http_client};

/// Creates an HTTP client that never retries, so tests against mock servers
/// fail fast.
pub fn create_test_http_client() -> Arc<ClientWithMiddleware> {
    let config = HttpRetryConfig { max_retries: 0, ..Default::default() };
    Arc::new(create_retryable_http_client(&config, Client::new()))
}
