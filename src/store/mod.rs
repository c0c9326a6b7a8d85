//! # Alert store
//!
//! Answers "what should be drawn over stream X right now". Events are kept
//! per stream key and expire after a short TTL. Expiry is applied lazily
//! whenever a stream is read. A stream that no surface is watching is evicted
//! once it has been idle for longer than the idle timeout.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::models::{BoundingBox, DetectionEvent, DetectionSource};

/// Live events for one stream, plus the number of surfaces watching it.
#[derive(Debug)]
struct StreamAlertSet {
    events: Vec<DetectionEvent>,
    subscribers: usize,
    last_activity: DateTime<Utc>,
}

impl StreamAlertSet {
    fn new(now: DateTime<Utc>) -> Self {
        Self { events: Vec::new(), subscribers: 0, last_activity: now }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }
}

/// Two events describe the same on-screen alert when they share class,
/// source and box.
fn same_alert(a: &DetectionEvent, b: &DetectionEvent) -> bool {
    a.object_class == b.object_class && a.source == b.source && a.bounding_box == b.bounding_box
}

/// TTL-filtered live detections, keyed by stream.
pub struct AlertStore {
    sets: DashMap<String, StreamAlertSet>,
    ttl: chrono::Duration,
    idle_eviction: chrono::Duration,
}

impl AlertStore {
    /// Creates an empty store.
    pub fn new(ttl: Duration, idle_eviction: Duration) -> Self {
        Self {
            sets: DashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            idle_eviction: chrono::Duration::from_std(idle_eviction)
                .unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Stores `event` under its stream key.
    ///
    /// Chat events are moved to the banner region. Events whose box is
    /// malformed are dropped and the call has no effect. An existing entry
    /// for the same alert is replaced, refreshing its receipt time.
    ///
    /// Returns whether the event was stored.
    pub fn record(&self, mut event: DetectionEvent) -> bool {
        if event.source == DetectionSource::Chat {
            event.bounding_box = BoundingBox::CHAT_BANNER;
        }
        if let Err(e) = event.bounding_box.validate() {
            tracing::warn!(
                stream = %event.stream_key,
                class = %event.object_class,
                error = %e,
                "Dropping detection with malformed box."
            );
            return false;
        }

        let received_at = event.received_at;
        let mut set = self
            .sets
            .entry(event.stream_key.clone())
            .or_insert_with(|| StreamAlertSet::new(received_at));
        match set.events.iter_mut().find(|existing| same_alert(existing, &event)) {
            Some(existing) => *existing = event,
            None => set.events.push(event),
        }
        set.touch(received_at);
        true
    }

    /// Returns the non-expired events for `stream_key`, oldest first.
    ///
    /// Expired entries are pruned as a side effect.
    pub fn active_for(&self, stream_key: &str, now: DateTime<Utc>) -> Vec<DetectionEvent> {
        let Some(mut set) = self.sets.get_mut(stream_key) else {
            return Vec::new();
        };
        let ttl = self.ttl;
        set.events.retain(|event| now.signed_duration_since(event.received_at) <= ttl);
        let mut active = set.events.clone();
        active.sort_by_key(|event| event.received_at);
        active
    }

    /// Registers a surface watching `stream_key`, creating the set if needed.
    pub fn attach(&self, stream_key: &str, now: DateTime<Utc>) {
        let mut set = self
            .sets
            .entry(stream_key.to_string())
            .or_insert_with(|| StreamAlertSet::new(now));
        set.subscribers += 1;
        set.touch(now);
        tracing::debug!(stream = %stream_key, subscribers = set.subscribers, "Surface attached.");
    }

    /// Releases a surface. The set becomes eligible for idle eviction once
    /// nothing watches it.
    pub fn detach(&self, stream_key: &str, now: DateTime<Utc>) {
        if let Some(mut set) = self.sets.get_mut(stream_key) {
            set.subscribers = set.subscribers.saturating_sub(1);
            set.touch(now);
            tracing::debug!(
                stream = %stream_key,
                subscribers = set.subscribers,
                "Surface detached."
            );
        }
    }

    /// Removes every unwatched set idle for longer than the idle timeout.
    /// Returns how many were removed.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let idle_eviction = self.idle_eviction;
        let before = self.sets.len();
        self.sets.retain(|stream_key, set| {
            let keep = set.subscribers > 0
                || now.signed_duration_since(set.last_activity) <= idle_eviction;
            if !keep {
                tracing::debug!(stream = %stream_key, "Evicting idle alert set.");
            }
            keep
        });
        before.saturating_sub(self.sets.len())
    }

    /// Runs [`AlertStore::evict_idle`] every `interval` until `cancel` fires.
    pub async fn run_eviction(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Alert store eviction stopped.");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = self.evict_idle(Utc::now());
                    if evicted > 0 {
                        tracing::info!(
                            evicted,
                            remaining = self.stream_count(),
                            "Evicted idle alert sets."
                        );
                    }
                }
            }
        }
    }

    /// Number of streams with a live set.
    pub fn stream_count(&self) -> usize {
        self.sets.len()
    }

    /// Whether a set exists for `stream_key`.
    pub fn contains(&self, stream_key: &str) -> bool {
        self.sets.contains_key(stream_key)
    }

    /// Number of surfaces watching `stream_key`.
    pub fn subscriber_count(&self, stream_key: &str) -> usize {
        self.sets.get(stream_key).map(|set| set.subscribers).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::test_helpers::DetectionEventBuilder;

    const KEY: &str = "https://chaturbate.com/alice";

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn store() -> AlertStore {
        AlertStore::new(Duration::from_secs(5), Duration::from_secs(300))
    }

    #[test]
    fn test_active_for_respects_ttl() {
        let store = store();
        store.record(DetectionEventBuilder::new(KEY).received_at(t(0)).build());

        assert_eq!(store.active_for(KEY, t(3)).len(), 1);
        assert!(store.active_for(KEY, t(6)).is_empty());
        // Pruned entries do not come back.
        assert!(store.active_for(KEY, t(3)).is_empty());
    }

    #[test]
    fn test_malformed_boxes_are_rejected() {
        let store = store();
        store.record(DetectionEventBuilder::new(KEY).class("person").received_at(t(0)).build());
        let before = store.active_for(KEY, t(1));

        for bbox in [
            [50.0, 10.0, 40.0, 20.0],
            [10.0, 50.0, 20.0, 50.0],
            [-1.0, 0.0, 10.0, 10.0],
            [0.0, 0.0, 101.0, 10.0],
            [f64::NAN, 0.0, 10.0, 10.0],
        ] {
            let event =
                DetectionEventBuilder::new(KEY).bounding_box(bbox).received_at(t(1)).build();
            assert!(!store.record(event));
        }

        assert_eq!(store.active_for(KEY, t(1)), before);
    }

    #[test]
    fn test_chat_events_use_banner_region() {
        let store = store();
        let event = DetectionEventBuilder::new(KEY)
            .chat("drugs")
            .bounding_box([-5.0, 0.0, 0.0, 0.0])
            .received_at(t(0))
            .build();

        assert!(store.record(event));

        let active = store.active_for(KEY, t(0));
        assert_eq!(active[0].bounding_box, BoundingBox::CHAT_BANNER);
    }

    #[test]
    fn test_same_alert_is_replaced_and_results_are_sorted() {
        let store = store();
        store.record(DetectionEventBuilder::new(KEY).class("knife").received_at(t(0)).build());
        store.record(DetectionEventBuilder::new(KEY).class("person").received_at(t(1)).build());
        store.record(DetectionEventBuilder::new(KEY).class("knife").received_at(t(2)).build());

        let active = store.active_for(KEY, t(2));

        assert_eq!(active.len(), 2);
        assert_eq!(active[0].object_class, "person");
        assert_eq!(active[1].object_class, "knife");
        assert_eq!(active[1].received_at, t(2));
    }

    #[test]
    fn test_streams_are_isolated() {
        let store = store();
        store.record(DetectionEventBuilder::new(KEY).received_at(t(0)).build());
        store.record(
            DetectionEventBuilder::new("https://stripchat.com/bob").received_at(t(0)).build(),
        );

        assert_eq!(store.stream_count(), 2);
        assert_eq!(store.active_for(KEY, t(0)).len(), 1);
        assert!(store.active_for("https://chaturbate.com/unknown", t(0)).is_empty());
    }

    #[test]
    fn test_idle_eviction_skips_watched_sets() {
        let store = store();
        store.attach(KEY, t(0));
        store.record(DetectionEventBuilder::new(KEY).received_at(t(0)).build());

        assert_eq!(store.evict_idle(t(1000)), 0);
        assert!(store.contains(KEY));

        store.detach(KEY, t(1000));
        assert_eq!(store.evict_idle(t(1200)), 0);
        assert_eq!(store.evict_idle(t(1301)), 1);
        assert!(!store.contains(KEY));
    }

    #[tokio::test]
    async fn test_run_eviction_stops_on_cancel() {
        let store = AlertStore::new(Duration::from_secs(5), Duration::ZERO);
        let a_second_ago = Utc::now() - chrono::Duration::seconds(1);
        store.record(DetectionEventBuilder::new(KEY).received_at(a_second_ago).build());
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            async move { store.run_eviction(Duration::from_millis(5), cancel).await; store }
        };
        let handle = tokio::spawn(task);
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        let store = handle.await.unwrap();

        assert_eq!(store.stream_count(), 0);
    }
}
