//! # Notification aggregator
//!
//! Decides which detection events become session notifications and owns
//! their read/unread lifecycle.
//!
//! Every qualifying event produces exactly one [`Notification`]. Toasts are
//! throttled per stream, so a burst of detections fills the history without
//! repeatedly interrupting the operator. Redelivered events are recognised by
//! their origin id or, lacking one, by identical content within a short
//! window, and are dropped before they reach the history. The unread count is recomputed from
//! the notification set after every mutation and published on a
//! [`tokio::sync::watch`] channel.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, watch};

use crate::models::{
    DedupPolicy, DetectionEvent, DetectionSource, FlaggedObjects, Notification,
    NotificationDetails, NotificationFilter, NotificationId, NotificationKind, StreamDirectory,
    ThrottlePolicy, ThrottleState, Toast, detection::streamer_from_key,
};

/// Title of toasts raised by object detections.
pub const DETECTION_TOAST_TITLE: &str = "Object Detected";

/// Title of toasts raised by chat keyword matches.
pub const CHAT_TOAST_TITLE: &str = "Chat Keyword";

const UNASSIGNED_AGENT: &str = "Unassigned";

/// Errors returned by notification lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    /// No notification with this id exists.
    #[error("Notification {0} not found")]
    NotFound(NotificationId),
}

/// Result of feeding a qualifying event to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedAlert {
    /// The stored notification.
    pub notification: Notification,
    /// The toast to surface, unless throttled.
    pub toast: Option<Toast>,
}

/// Identity used to recognise a redelivered event.
///
/// Floats are keyed by their bit pattern, so only byte-identical payloads
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    /// Server-assigned id, unique per stream and class.
    Origin { origin_id: String, stream_key: String, class: String, confidence: Option<u64> },
    /// Payload fingerprint for events that carry no id.
    Content {
        stream_key: String,
        class: String,
        source: DetectionSource,
        bounding_box: [u64; 4],
        confidence: Option<u64>,
    },
}

impl DedupKey {
    fn of(event: &DetectionEvent) -> Self {
        let confidence = event.confidence.map(f64::to_bits);
        match &event.origin_id {
            Some(origin_id) => DedupKey::Origin {
                origin_id: origin_id.clone(),
                stream_key: event.stream_key.clone(),
                class: event.object_class.clone(),
                confidence,
            },
            None => {
                let b = event.bounding_box;
                DedupKey::Content {
                    stream_key: event.stream_key.clone(),
                    class: event.object_class.clone(),
                    source: event.source,
                    bounding_box: [b.left, b.top, b.right, b.bottom].map(f64::to_bits),
                    confidence,
                }
            }
        }
    }
}

/// Seen keys with the latest receipt time of each.
#[derive(Default)]
struct SeenEvents {
    keys: HashMap<DedupKey, DateTime<Utc>>,
}

impl SeenEvents {
    /// Records `key` at `at` and returns whether it is a redelivery.
    ///
    /// Origin keys match for as long as they are remembered. Content keys
    /// match only within the policy's content window of the previous
    /// sighting. Keys idle for longer than the policy horizon are dropped.
    fn check(&mut self, key: DedupKey, at: DateTime<Utc>, policy: &DedupPolicy) -> bool {
        self.prune(at, policy);
        match self.keys.get_mut(&key) {
            Some(last) => {
                let window = policy.content_window_secs;
                let duplicate = match key {
                    DedupKey::Origin { .. } => true,
                    DedupKey::Content { .. } => at <= *last + window && *last <= at + window,
                };
                *last = (*last).max(at);
                duplicate
            }
            None => {
                self.keys.insert(key, at);
                false
            }
        }
    }

    fn prune(&mut self, now: DateTime<Utc>, policy: &DedupPolicy) {
        let horizon = policy.horizon();
        self.keys.retain(|_, last| *last + horizon >= now);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.keys.len()
    }
}

#[derive(Default)]
struct AggregatorState {
    notifications: Vec<Notification>,
    seen: SeenEvents,
    throttles: HashMap<String, ThrottleState>,
    flagged: Option<FlaggedObjects>,
    directory: StreamDirectory,
}

impl AggregatorState {
    fn unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

/// Owns the session's notifications.
pub struct NotificationAggregator {
    state: Mutex<AggregatorState>,
    next_id: AtomicU64,
    throttle_policy: ThrottlePolicy,
    dedup_policy: DedupPolicy,
    unread_tx: watch::Sender<usize>,
}

impl NotificationAggregator {
    /// Creates an empty aggregator.
    pub fn new(throttle_policy: ThrottlePolicy) -> Self {
        let (unread_tx, _) = watch::channel(0);
        Self {
            state: Mutex::new(AggregatorState::default()),
            next_id: AtomicU64::new(1),
            throttle_policy,
            dedup_policy: DedupPolicy::default(),
            unread_tx,
        }
    }

    /// Sets the policy used to recognise redelivered events.
    pub fn with_dedup_policy(mut self, dedup_policy: DedupPolicy) -> Self {
        self.dedup_policy = dedup_policy;
        self
    }

    /// Replaces the flagged-object settings used to qualify AI events.
    ///
    /// Until a list is supplied every AI event qualifies, which matches the
    /// notification feed where the backend has already filtered detections.
    pub async fn update_flagged_objects(&self, flagged: FlaggedObjects) {
        let mut state = self.state.lock().await;
        tracing::debug!(count = flagged.len(), "Updated flagged objects.");
        state.flagged = Some(flagged);
    }

    /// Replaces the stream directory used for enrichment.
    pub async fn update_directory(&self, directory: StreamDirectory) {
        let mut state = self.state.lock().await;
        tracing::debug!(streams = directory.len(), "Updated stream directory.");
        state.directory = directory;
    }

    /// Feeds one event to the aggregator.
    ///
    /// Returns `None` when the event does not qualify or replays one that
    /// was already seen. Throttling uses the event's receipt time.
    pub async fn on_detection_event(&self, event: &DetectionEvent) -> Option<AggregatedAlert> {
        let mut state = self.state.lock().await;

        let qualifies = match event.source {
            DetectionSource::Chat => true,
            DetectionSource::Ai => match &state.flagged {
                Some(flagged) => flagged.qualifies(&event.object_class, event.confidence),
                None => true,
            },
        };
        if !qualifies {
            tracing::trace!(
                stream = %event.stream_key,
                class = %event.object_class,
                "Event does not qualify for a notification."
            );
            return None;
        }

        if state.seen.check(DedupKey::of(event), event.received_at, &self.dedup_policy) {
            tracing::debug!(
                origin_id = ?event.origin_id,
                stream = %event.stream_key,
                class = %event.object_class,
                "Ignoring duplicate event."
            );
            return None;
        }

        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = build_notification(id, event, &state.directory);
        state.notifications.push(notification.clone());

        let now = event.received_at;
        let admitted = state
            .throttles
            .entry(event.stream_key.clone())
            .or_insert_with(|| ThrottleState::new(now))
            .admit(&self.throttle_policy, now);

        let toast = if admitted {
            tracing::info!(
                notification_id = %id,
                stream = %event.stream_key,
                "Raising toast."
            );
            Some(Toast {
                title: toast_title(notification.kind).to_string(),
                notification: notification.clone(),
            })
        } else {
            tracing::debug!(stream = %event.stream_key, "Toast throttled.");
            None
        };

        self.publish_unread(&state);
        Some(AggregatedAlert { notification, toast })
    }

    /// Marks one notification as read.
    pub async fn mark_as_read(&self, id: NotificationId) -> Result<(), AggregatorError> {
        let mut state = self.state.lock().await;
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(AggregatorError::NotFound(id))?;
        notification.read = true;
        self.publish_unread(&state);
        Ok(())
    }

    /// Marks every notification as read.
    pub async fn mark_all_as_read(&self) {
        let mut state = self.state.lock().await;
        state.notifications.iter_mut().for_each(|n| n.read = true);
        self.publish_unread(&state);
    }

    /// Deletes one notification.
    pub async fn delete(&self, id: NotificationId) -> Result<(), AggregatorError> {
        let mut state = self.state.lock().await;
        let index = state
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or(AggregatorError::NotFound(id))?;
        state.notifications.remove(index);
        self.publish_unread(&state);
        Ok(())
    }

    /// Deletes every notification.
    pub async fn delete_all(&self) {
        let mut state = self.state.lock().await;
        state.notifications.clear();
        self.publish_unread(&state);
    }

    /// Notifications passing `filter`, newest first.
    pub async fn list(&self, filter: NotificationFilter) -> Vec<Notification> {
        let state = self.state.lock().await;
        let mut notifications: Vec<Notification> =
            state.notifications.iter().filter(|n| filter.matches(n)).cloned().collect();
        notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        notifications
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self) -> usize {
        self.state.lock().await.unread()
    }

    /// Watches the unread count.
    pub fn subscribe_unread(&self) -> watch::Receiver<usize> {
        self.unread_tx.subscribe()
    }

    fn publish_unread(&self, state: &AggregatorState) {
        self.unread_tx.send_replace(state.unread());
    }
}

fn toast_title(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Detection => DETECTION_TOAST_TITLE,
        NotificationKind::Chat => CHAT_TOAST_TITLE,
    }
}

fn confidence_percent(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 10.0
}

fn build_notification(
    id: NotificationId,
    event: &DetectionEvent,
    directory: &StreamDirectory,
) -> Notification {
    let stream = directory.get(&event.stream_key);
    let streamer_name = stream
        .and_then(|s| s.streamer())
        .unwrap_or_else(|| streamer_from_key(&event.stream_key).to_string());
    let agent_name = stream
        .and_then(|s| s.agent.as_ref())
        .and_then(|a| a.display_name())
        .unwrap_or_else(|| UNASSIGNED_AGENT.to_string());
    let confidence_percent = match event.source {
        DetectionSource::Ai => event.confidence.map(confidence_percent),
        DetectionSource::Chat => None,
    };

    let (kind, message) = match event.source {
        DetectionSource::Ai => (
            NotificationKind::Detection,
            match confidence_percent {
                Some(pct) => {
                    format!("Detected {} ({pct:.1}%) in {streamer_name}", event.object_class)
                }
                None => format!("Detected {} in {streamer_name}", event.object_class),
            },
        ),
        DetectionSource::Chat => (
            NotificationKind::Chat,
            format!(
                "Chat keyword \"{}\" flagged in {streamer_name}",
                event.keyword().unwrap_or(&event.object_class)
            ),
        ),
    };

    let image_url = event
        .image_url
        .clone()
        .or_else(|| stream.and_then(|s| s.thumbnail_url(event.received_at)));

    Notification {
        id,
        message,
        timestamp: event.received_at,
        read: false,
        kind,
        image_url,
        stream_key: event.stream_key.clone(),
        details: NotificationDetails {
            stream_id: stream.map(|s| s.id),
            agent_name,
            streamer_name,
            platform: stream.and_then(|s| s.platform),
            confidence_percent,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;
    use crate::{
        models::{FlaggedObject, PlatformKind},
        test_helpers::{DetectionEventBuilder, StreamInfoBuilder},
    };

    const KEY: &str = "https://chaturbate.com/alice";

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    async fn aggregator() -> NotificationAggregator {
        let aggregator = NotificationAggregator::new(ThrottlePolicy::default());
        aggregator
            .update_flagged_objects(FlaggedObjects::new([FlaggedObject {
                id: Some(1),
                object_name: "knife".into(),
                confidence_threshold: 0.5,
            }]))
            .await;
        aggregator
    }

    /// A knife detection whose box drifts with the receipt second, so
    /// detections at different times never share content.
    fn knife(at: DateTime<Utc>) -> DetectionEvent {
        let x = (at.timestamp() % 50) as f64;
        DetectionEventBuilder::new(KEY)
            .class("knife")
            .confidence(0.87)
            .bounding_box([x, 10.0, x + 40.0, 50.0])
            .received_at(at)
            .build()
    }

    #[tokio::test]
    async fn test_unflagged_or_low_confidence_events_do_not_qualify() {
        let aggregator = aggregator().await;

        let person = DetectionEventBuilder::new(KEY).class("person").confidence(0.99).build();
        let weak = DetectionEventBuilder::new(KEY).class("knife").confidence(0.2).build();

        assert!(aggregator.on_detection_event(&person).await.is_none());
        assert!(aggregator.on_detection_event(&weak).await.is_none());
        assert!(aggregator.list(NotificationFilter::All).await.is_empty());
    }

    #[tokio::test]
    async fn test_chat_events_always_qualify() {
        let aggregator = NotificationAggregator::new(ThrottlePolicy::default());
        let event = DetectionEventBuilder::new(KEY).chat("drugs").build();

        let alert = aggregator.on_detection_event(&event).await.unwrap();

        assert_eq!(alert.notification.kind, NotificationKind::Chat);
        assert_eq!(alert.notification.message, "Chat keyword \"drugs\" flagged in alice");
        assert_eq!(alert.toast.unwrap().title, CHAT_TOAST_TITLE);
    }

    #[tokio::test]
    async fn test_ai_events_qualify_without_flagged_list() {
        let aggregator = NotificationAggregator::new(ThrottlePolicy::default());
        let event = DetectionEventBuilder::new(KEY).class("bottle").confidence(0.4).build();

        assert!(aggregator.on_detection_event(&event).await.is_some());

        aggregator.update_flagged_objects(FlaggedObjects::default()).await;
        assert!(aggregator.on_detection_event(&event).await.is_none());
    }

    #[tokio::test]
    async fn test_same_millisecond_events_get_distinct_ids() {
        let aggregator = aggregator().await;

        let second = DetectionEventBuilder::new(KEY)
            .class("knife")
            .confidence(0.91)
            .received_at(t(0))
            .build();

        let a = aggregator.on_detection_event(&knife(t(0))).await.unwrap();
        let b = aggregator.on_detection_event(&second).await.unwrap();

        assert_ne!(a.notification.id, b.notification.id);
    }

    #[tokio::test]
    async fn test_throttle_one_toast_per_window() {
        let aggregator = aggregator().await;
        let mut toasts = 0;

        for i in 0..10 {
            let alert = aggregator.on_detection_event(&knife(t(i * 5))).await.unwrap();
            toasts += usize::from(alert.toast.is_some());
        }

        assert_eq!(toasts, 1);
        assert_eq!(aggregator.list(NotificationFilter::All).await.len(), 10);

        let later = aggregator.on_detection_event(&knife(t(61))).await.unwrap();
        assert!(later.toast.is_some());
    }

    #[tokio::test]
    async fn test_throttle_is_per_stream() {
        let aggregator = aggregator().await;
        let other = DetectionEventBuilder::new("https://stripchat.com/bob")
            .class("knife")
            .confidence(0.9)
            .received_at(t(1))
            .build();

        assert!(aggregator.on_detection_event(&knife(t(0))).await.unwrap().toast.is_some());
        assert!(aggregator.on_detection_event(&other).await.unwrap().toast.is_some());
    }

    #[tokio::test]
    async fn test_unread_count_tracks_every_operation() {
        let aggregator = aggregator().await;
        let unread = aggregator.subscribe_unread();

        let mut ids = Vec::new();
        for i in 0..3 {
            ids.push(aggregator.on_detection_event(&knife(t(i))).await.unwrap().notification.id);
            assert_eq!(aggregator.unread_count().await, ids.len());
            assert_eq!(*unread.borrow(), ids.len());
        }

        aggregator.mark_as_read(ids[0]).await.unwrap();
        assert_eq!(aggregator.unread_count().await, 2);
        assert_eq!(*unread.borrow(), 2);

        aggregator.delete(ids[1]).await.unwrap();
        assert_eq!(aggregator.unread_count().await, 1);
        assert_eq!(*unread.borrow(), 1);

        aggregator.mark_all_as_read().await;
        assert_eq!(aggregator.unread_count().await, 0);
        assert_eq!(*unread.borrow(), 0);

        aggregator.on_detection_event(&knife(t(10))).await.unwrap();
        aggregator.delete_all().await;
        assert_eq!(aggregator.unread_count().await, 0);
        assert_eq!(*unread.borrow(), 0);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_rejected() {
        let aggregator = aggregator().await;

        assert_eq!(
            aggregator.mark_as_read(NotificationId(99)).await,
            Err(AggregatorError::NotFound(NotificationId(99)))
        );
        assert_eq!(
            aggregator.delete(NotificationId(99)).await,
            Err(AggregatorError::NotFound(NotificationId(99)))
        );
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let aggregator = aggregator().await;
        let late = aggregator.on_detection_event(&knife(t(20))).await.unwrap();
        let early = aggregator.on_detection_event(&knife(t(10))).await.unwrap();
        let chat = DetectionEventBuilder::new(KEY).chat("scam").received_at(t(15)).build();
        let chat = aggregator.on_detection_event(&chat).await.unwrap();
        aggregator.mark_as_read(late.notification.id).await.unwrap();

        let all: Vec<_> =
            aggregator.list(NotificationFilter::All).await.into_iter().map(|n| n.id).collect();
        assert_eq!(all, vec![late.notification.id, chat.notification.id, early.notification.id]);

        let unread: Vec<_> =
            aggregator.list(NotificationFilter::Unread).await.into_iter().map(|n| n.id).collect();
        assert_eq!(unread, vec![chat.notification.id, early.notification.id]);

        let detections: Vec<_> = aggregator
            .list(NotificationFilter::Detection)
            .await
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(detections, vec![late.notification.id, early.notification.id]);
    }

    #[tokio::test]
    async fn test_duplicate_origin_ids_are_ignored() {
        let aggregator = aggregator().await;
        let event = DetectionEventBuilder::new(KEY)
            .class("knife")
            .confidence(0.9)
            .origin_id("17")
            .build();

        assert!(aggregator.on_detection_event(&event).await.is_some());
        assert!(aggregator.on_detection_event(&event).await.is_none());
        assert_eq!(aggregator.list(NotificationFilter::All).await.len(), 1);
    }

    #[tokio::test]
    async fn test_same_origin_id_with_new_confidence_is_recorded() {
        let aggregator = aggregator().await;
        let first = DetectionEventBuilder::new(KEY)
            .class("knife")
            .confidence(0.7)
            .origin_id("17")
            .received_at(t(0))
            .build();
        let refined = DetectionEventBuilder::new(KEY)
            .class("knife")
            .confidence(0.9)
            .origin_id("17")
            .received_at(t(1))
            .build();

        assert!(aggregator.on_detection_event(&first).await.is_some());
        assert!(aggregator.on_detection_event(&refined).await.is_some());
        assert!(aggregator.on_detection_event(&refined).await.is_none());
        assert_eq!(aggregator.list(NotificationFilter::All).await.len(), 2);
    }

    #[tokio::test]
    async fn test_identical_content_is_ignored_within_window() {
        let aggregator = aggregator().await;
        let at = |secs| {
            DetectionEventBuilder::new(KEY)
                .class("knife")
                .confidence(0.87)
                .received_at(t(secs))
                .build()
        };

        assert!(aggregator.on_detection_event(&at(0)).await.is_some());
        assert!(aggregator.on_detection_event(&at(2)).await.is_none());
        assert!(aggregator.on_detection_event(&at(4)).await.is_none());
        assert_eq!(aggregator.list(NotificationFilter::All).await.len(), 1);

        // The window restarts at the last sighting.
        assert!(aggregator.on_detection_event(&at(18)).await.is_none());
        assert!(aggregator.on_detection_event(&at(40)).await.is_some());
        assert_eq!(aggregator.list(NotificationFilter::All).await.len(), 2);
    }

    #[tokio::test]
    async fn test_content_window_is_configurable() {
        let aggregator = aggregator().await.with_dedup_policy(DedupPolicy {
            content_window_secs: Duration::ZERO,
            retention_secs: Duration::from_secs(60),
        });
        let event = DetectionEventBuilder::new(KEY).class("knife").received_at(t(0)).build();
        let later = DetectionEventBuilder::new(KEY).class("knife").received_at(t(1)).build();

        assert!(aggregator.on_detection_event(&event).await.is_some());
        assert!(aggregator.on_detection_event(&event).await.is_none());
        assert!(aggregator.on_detection_event(&later).await.is_some());
    }

    #[tokio::test]
    async fn test_seen_keys_expire_after_retention() {
        let aggregator = aggregator().await;
        let old = DetectionEventBuilder::new(KEY)
            .class("knife")
            .origin_id("1")
            .received_at(t(0))
            .build();
        let recent = DetectionEventBuilder::new(KEY)
            .class("knife")
            .origin_id("2")
            .received_at(t(100))
            .build();

        assert!(aggregator.on_detection_event(&old).await.is_some());
        assert!(aggregator.on_detection_event(&recent).await.is_some());
        assert_eq!(aggregator.state.lock().await.seen.len(), 1);

        assert!(aggregator.on_detection_event(&recent).await.is_none());
        assert_eq!(aggregator.state.lock().await.seen.len(), 1);
    }

    #[tokio::test]
    async fn test_content_is_independent_of_arrival_order() {
        let events = vec![
            knife(t(0)),
            DetectionEventBuilder::new(KEY).chat("drugs").received_at(t(1)).build(),
            DetectionEventBuilder::new("https://stripchat.com/bob")
                .class("knife")
                .confidence(0.75)
                .received_at(t(2))
                .build(),
            knife(t(3)),
        ];

        let mut contents = Vec::new();
        for order in [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1]] {
            let aggregator = aggregator().await;
            for i in order {
                aggregator.on_detection_event(&events[i]).await;
            }
            let mut content: Vec<_> = aggregator
                .list(NotificationFilter::All)
                .await
                .into_iter()
                .map(|n| (n.message, n.timestamp, n.details))
                .collect();
            content.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
            contents.push(content);
        }

        assert_eq!(contents[0].len(), 4);
        assert!(contents.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_notifications_are_enriched_from_directory() {
        let aggregator = aggregator().await;
        let stream = StreamInfoBuilder::new(KEY)
            .id(7)
            .platform(PlatformKind::Chaturbate)
            .agent("Jane", "Doe")
            .build();
        aggregator.update_directory(StreamDirectory::new([stream])).await;

        let alert = aggregator.on_detection_event(&knife(t(0))).await.unwrap();
        let notification = alert.notification;

        assert_eq!(notification.message, "Detected knife (87.0%) in alice");
        assert_eq!(notification.details.stream_id, Some(7));
        assert_eq!(notification.details.agent_name, "Jane Doe");
        assert_eq!(notification.details.platform, Some(PlatformKind::Chaturbate));
        assert_eq!(notification.details.confidence_percent, Some(87.0));
        assert!(notification.image_url.unwrap().starts_with("https://jpeg.live.mmcdn.com/"));
        assert_eq!(alert.toast.unwrap().title, DETECTION_TOAST_TITLE);
    }

    #[tokio::test]
    async fn test_unknown_stream_falls_back_to_defaults() {
        let aggregator = aggregator().await;

        let notification = aggregator.on_detection_event(&knife(t(0))).await.unwrap().notification;

        assert_eq!(notification.details.agent_name, UNASSIGNED_AGENT);
        assert_eq!(notification.details.streamer_name, "alice");
        assert_eq!(notification.details.stream_id, None);
        assert_eq!(notification.timestamp, t(0));
    }
}
