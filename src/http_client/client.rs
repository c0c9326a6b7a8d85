//! Client construction shared by the backend, feed and webhook callers.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{BaseHttpClientConfig, HttpRetryConfig, JitterSetting};

/// Builds the plain `reqwest` client from the base settings.
pub fn build_base_client(config: &BaseHttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(Some(config.idle_timeout))
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(Some(config.tcp_keepalive))
        .build()
}

/// Wraps `base_client` so transient failures (connection resets, 5xx, 429)
/// are retried with exponential backoff.
///
/// A policy with `max_retries == 0` gets no retry layer at all. Event feeds
/// use that, since their reconnection happens one level up.
pub fn create_retryable_http_client(
    config: &HttpRetryConfig,
    base_client: reqwest::Client,
) -> ClientWithMiddleware {
    if config.max_retries == 0 {
        return ClientBuilder::new(base_client).build();
    }

    let jitter = match config.jitter {
        JitterSetting::None => Jitter::None,
        JitterSetting::Full => Jitter::Full,
    };
    let backoff = ExponentialBackoff::builder()
        .jitter(jitter)
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_secs)
        .build_with_max_retries(config.max_retries);

    ClientBuilder::new(base_client).with(RetryTransientMiddleware::new_with_policy(backoff)).build()
}
