//! HTTP clients for the backend REST endpoints, the event feeds and the
//! webhook sinks, pooled by retry policy.

mod client;
mod pool;

pub use client::{build_base_client, create_retryable_http_client};
pub use pool::{HttpClientPool, HttpClientPoolError};
