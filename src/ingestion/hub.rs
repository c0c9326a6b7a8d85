//! Shared, reference-counted feed channels.

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{EventSource, FeedFrame, normalize::normalize};
use crate::models::{DetectionEvent, FeedTarget};

type Subscribers = Arc<DashMap<u64, mpsc::Sender<DetectionEvent>>>;

/// One open feed and the subscribers sharing it.
struct SharedChannel {
    subscribers: Subscribers,
    cancel: CancellationToken,
}

struct HubInner {
    source: Arc<dyn EventSource>,
    reconnect_delay: Duration,
    subscriber_capacity: usize,
    channels: DashMap<FeedTarget, SharedChannel>,
    next_id: AtomicU64,
}

impl HubInner {
    fn release(&self, target: FeedTarget, id: u64) {
        if let Entry::Occupied(entry) = self.channels.entry(target) {
            entry.get().subscribers.remove(&id);
            if entry.get().subscribers.is_empty() {
                entry.get().cancel.cancel();
                entry.remove();
                tracing::info!(%target, "Last subscriber left, closing event feed.");
            }
        }
    }
}

impl Drop for HubInner {
    fn drop(&mut self) {
        for channel in self.channels.iter() {
            channel.cancel.cancel();
        }
    }
}

/// Fans each feed out to any number of subscribers over a single physical
/// connection per feed.
///
/// The first [`ChannelHub::subscribe`] for a feed opens the connection;
/// dropping the last [`Subscription`] closes it. Must be used from within a
/// Tokio runtime.
#[derive(Clone)]
pub struct ChannelHub {
    inner: Arc<HubInner>,
}

impl ChannelHub {
    /// Creates a hub over `source`.
    ///
    /// `subscriber_capacity` bounds each subscriber's queue; events for a
    /// subscriber whose queue is full are dropped and logged.
    pub fn new(
        source: Arc<dyn EventSource>,
        reconnect_delay: Duration,
        subscriber_capacity: usize,
    ) -> Self {
        Self {
            inner: Arc::new(HubInner {
                source,
                reconnect_delay,
                subscriber_capacity: subscriber_capacity.max(1),
                channels: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a subscriber on `target`, opening the feed if needed.
    pub fn subscribe(&self, target: FeedTarget) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.inner.subscriber_capacity);

        let channel = self.inner.channels.entry(target).or_insert_with(|| {
            tracing::info!(%target, "First subscriber, opening event feed.");
            let channel = SharedChannel {
                subscribers: Arc::new(DashMap::new()),
                cancel: CancellationToken::new(),
            };
            tokio::spawn(run_transport(
                Arc::clone(&self.inner.source),
                target,
                Arc::clone(&channel.subscribers),
                channel.cancel.clone(),
                self.inner.reconnect_delay,
            ));
            channel
        });
        channel.subscribers.insert(id, sender);
        tracing::debug!(
            %target,
            subscriber = id,
            total = channel.subscribers.len(),
            "Subscribed to event feed."
        );

        Subscription { id, target, receiver, hub: Arc::downgrade(&self.inner) }
    }

    /// Number of live subscribers on `target`.
    pub fn subscriber_count(&self, target: FeedTarget) -> usize {
        self.inner.channels.get(&target).map(|c| c.subscribers.len()).unwrap_or(0)
    }

    /// Whether a connection for `target` is currently held open.
    pub fn is_open(&self, target: FeedTarget) -> bool {
        self.inner.channels.contains_key(&target)
    }

    /// Number of physical transports held for `target` (0 or 1).
    pub fn connection_count(&self, target: FeedTarget) -> usize {
        usize::from(self.is_open(target))
    }
}

/// A handle on a shared feed. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    target: FeedTarget,
    receiver: mpsc::Receiver<DetectionEvent>,
    hub: Weak<HubInner>,
}

impl Subscription {
    /// Waits for the next event. Returns `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<DetectionEvent> {
        self.receiver.recv().await
    }

    /// The feed this subscription listens to.
    pub fn target(&self) -> FeedTarget {
        self.target
    }

    /// Explicitly unsubscribes. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.release(self.target, self.id);
        }
    }
}

fn fan_out(subscribers: &Subscribers, target: FeedTarget, events: Vec<DetectionEvent>) {
    for event in events {
        for subscriber in subscribers.iter() {
            match subscriber.value().try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        %target,
                        subscriber = *subscriber.key(),
                        "Subscriber queue full, dropping event."
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }
}

/// Keeps one feed connected until `cancel` fires, reconnecting after
/// `reconnect_delay` whenever the transport drops. A retry interval sent by
/// the server replaces `reconnect_delay` for the rest of the feed's life.
async fn run_transport(
    source: Arc<dyn EventSource>,
    target: FeedTarget,
    subscribers: Subscribers,
    cancel: CancellationToken,
    mut reconnect_delay: Duration,
) {
    loop {
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = source.connect(target) => result,
        };

        match connected {
            Ok(mut messages) => {
                tracing::info!(%target, "Event feed connected.");
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!(%target, "Event feed closed.");
                            return;
                        }
                        next = messages.next() => match next {
                            Some(Ok(FeedFrame::Message(raw))) => {
                                let events = normalize(target, &raw, Utc::now());
                                tracing::debug!(
                                    %target,
                                    count = events.len(),
                                    "Received feed message."
                                );
                                fan_out(&subscribers, target, events);
                            }
                            Some(Ok(FeedFrame::Retry(delay))) => {
                                tracing::debug!(%target, ?delay, "Server set reconnect delay.");
                                reconnect_delay = delay;
                            }
                            Some(Err(e)) => {
                                tracing::warn!(%target, error = %e, "Event feed transport error.");
                                break;
                            }
                            None => {
                                tracing::warn!(%target, "Event feed ended.");
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(%target, error = %e, "Failed to connect to event feed.");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(reconnect_delay) => {
                tracing::debug!(%target, "Reconnecting event feed.");
            }
        }
    }
    tracing::info!(%target, "Event feed closed.");
}
