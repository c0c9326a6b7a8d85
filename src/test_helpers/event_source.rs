//! An in-memory `EventSource` driven by the test.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio::sync::broadcast;

use crate::{
    ingestion::{EventSource, FeedFrame, IngestionError, RawMessageStream},
    models::FeedTarget,
};

/// An `EventSource` whose messages are pushed by the test.
///
/// Each `connect` opens a new logical connection. Messages pushed with
/// [`ScriptedEventSource::push`] reach every open connection on that feed.
pub struct ScriptedEventSource {
    feeds: HashMap<FeedTarget, broadcast::Sender<String>>,
    connects: Arc<AtomicUsize>,
}

impl Default for ScriptedEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEventSource {
    /// Creates a source with both feeds idle.
    pub fn new() -> Self {
        let feeds = [FeedTarget::Detections, FeedTarget::Notifications]
            .into_iter()
            .map(|target| (target, broadcast::channel(256).0))
            .collect();
        Self { feeds, connects: Arc::new(AtomicUsize::new(0)) }
    }

    /// Pushes a raw message and returns how many connections received it.
    pub fn push(&self, target: FeedTarget, raw: impl Into<String>) -> usize {
        self.feeds.get(&target).and_then(|feed| feed.send(raw.into()).ok()).unwrap_or(0)
    }

    /// Total number of `connect` calls so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of currently open connections on `target`.
    pub fn open_connections(&self, target: FeedTarget) -> usize {
        self.feeds.get(&target).map(|feed| feed.receiver_count()).unwrap_or(0)
    }

    /// Waits until exactly `count` connections are open on `target`.
    pub async fn wait_for_connections(&self, target: FeedTarget, count: usize) {
        while self.open_connections(target) != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl EventSource for ScriptedEventSource {
    async fn connect(&self, target: FeedTarget) -> Result<RawMessageStream, IngestionError> {
        let feed = self
            .feeds
            .get(&target)
            .ok_or_else(|| IngestionError::Closed(format!("no scripted feed for {target}")))?;
        self.connects.fetch_add(1, Ordering::SeqCst);
        let receiver = feed.subscribe();

        let messages = stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(raw) => return Some((Ok(FeedFrame::Message(raw)), receiver)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(messages.boxed())
    }
}
