use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;

use crate::{
    models::{Toast, WebhookSinkConfig},
    sinks::{AlertSink, AlertSinkError},
};

/// A sink that POSTs each toast as JSON to a webhook.
pub struct WebhookSink {
    config: WebhookSinkConfig,
    headers: HeaderMap,
    client: Arc<ClientWithMiddleware>,
}

impl WebhookSink {
    /// Creates a new `WebhookSink`. Fails if a configured header is invalid.
    pub fn new(
        config: WebhookSinkConfig,
        client: Arc<ClientWithMiddleware>,
    ) -> Result<Self, AlertSinkError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in config.headers.iter().flatten() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| AlertSinkError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| AlertSinkError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }
        Ok(Self { config, headers, client })
    }
}

#[async_trait::async_trait]
impl AlertSink for WebhookSink {
    fn name(&self) -> String {
        format!("webhook:{}", self.config.url)
    }

    async fn deliver(&self, toast: &Toast) -> Result<(), AlertSinkError> {
        let body = serde_json::to_vec(toast)?;
        let response = self
            .client
            .post(self.config.url.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertSinkError::Status {
                status: status.as_u16(),
                url: self.config.url.to_string(),
            });
        }
        tracing::debug!(url = %self.config.url, "Delivered toast to webhook.");
        Ok(())
    }
}
