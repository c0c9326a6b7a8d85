//! Transport seam for the event feeds.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
#[cfg(test)]
use mockall::automock;
use reqwest::header::{ACCEPT, CACHE_CONTROL, COOKIE};
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

use super::{IngestionError, sse::SseDecoder};
use crate::models::FeedTarget;

/// One item read from a feed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFrame {
    /// A raw message payload (the `data` of a server-sent event).
    Message(String),
    /// The server asked clients to wait this long before reconnecting.
    Retry(Duration),
}

/// Stream of frames from one connection, in arrival order. The stream ends,
/// or yields an error, when the transport drops.
pub type RawMessageStream = BoxStream<'static, Result<FeedFrame, IngestionError>>;

/// Opens a physical connection to one feed.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Connects to `target` and returns its messages in arrival order.
    async fn connect(&self, target: FeedTarget) -> Result<RawMessageStream, IngestionError>;
}

/// `EventSource` over HTTP server-sent events.
pub struct HttpEventSource {
    client: Arc<ClientWithMiddleware>,
    base_url: Url,
    session_cookie: Option<String>,
}

impl HttpEventSource {
    /// Creates a source that resolves feed paths against `base_url`.
    pub fn new(
        client: Arc<ClientWithMiddleware>,
        base_url: Url,
        session_cookie: Option<String>,
    ) -> Self {
        Self { client, base_url, session_cookie }
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn connect(&self, target: FeedTarget) -> Result<RawMessageStream, IngestionError> {
        let url = self.base_url.join(target.path())?;
        tracing::debug!(%url, %target, "Opening event feed.");

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestionError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let mut decoder = SseDecoder::new();
        let mut retry_ms = None;
        let messages = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => {
                    let mut frames: Vec<_> = decoder
                        .feed(&bytes)
                        .into_iter()
                        .map(|m| Ok(FeedFrame::Message(m.data)))
                        .collect();
                    if decoder.retry_ms() != retry_ms {
                        retry_ms = decoder.retry_ms();
                        frames.extend(
                            retry_ms.map(|ms| Ok(FeedFrame::Retry(Duration::from_millis(ms)))),
                        );
                    }
                    frames
                }
                Err(e) => vec![Err(IngestionError::Body(e.to_string()))],
            })
            .flat_map(futures::stream::iter);

        Ok(messages.boxed())
    }
}
