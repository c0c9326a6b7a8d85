//! Keeps one mounted overlay per stream in the directory.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    ingestion::ChannelHub,
    models::StreamDirectory,
    overlay::{OverlaySurface, SurfaceSize, SurfaceState},
    store::AlertStore,
};

/// Mounts and unmounts overlay surfaces as streams come and go.
pub struct SurfaceManager {
    hub: ChannelHub,
    store: Arc<AlertStore>,
    size: SurfaceSize,
    cadence: Duration,
    surfaces: HashMap<String, OverlaySurface>,
}

impl SurfaceManager {
    /// Creates a manager with nothing mounted.
    pub fn new(
        hub: ChannelHub,
        store: Arc<AlertStore>,
        size: SurfaceSize,
        cadence: Duration,
    ) -> Self {
        Self { hub, store, size, cadence, surfaces: HashMap::new() }
    }

    /// Mounts a surface for every stream in `directory` that lacks one and
    /// unmounts surfaces whose stream disappeared. Returns the number mounted
    /// and unmounted.
    pub async fn reconcile(&mut self, directory: &StreamDirectory) -> (usize, usize) {
        let gone: Vec<String> =
            self.surfaces.keys().filter(|key| directory.get(key).is_none()).cloned().collect();
        for key in &gone {
            if let Some(mut surface) = self.surfaces.remove(key) {
                surface.unmount(Utc::now()).await;
            }
        }

        let mut mounted = 0;
        for key in directory.keys() {
            if !self.surfaces.contains_key(key) {
                let surface = OverlaySurface::mount(
                    key,
                    self.size,
                    &self.hub,
                    Arc::clone(&self.store),
                    self.cadence,
                );
                self.surfaces.insert(key.clone(), surface);
                mounted += 1;
            }
        }

        if mounted > 0 || !gone.is_empty() {
            tracing::info!(
                mounted,
                unmounted = gone.len(),
                total = self.surfaces.len(),
                "Reconciled overlay surfaces."
            );
        }
        (mounted, gone.len())
    }

    /// Unmounts everything.
    pub async fn unmount_all(&mut self) {
        for (_, mut surface) in self.surfaces.drain() {
            surface.unmount(Utc::now()).await;
        }
    }

    /// Number of mounted surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// State of the surface for `stream_key`.
    pub fn state(&self, stream_key: &str) -> SurfaceState {
        self.surfaces.get(stream_key).map(|s| s.state()).unwrap_or(SurfaceState::Unmounted)
    }

    /// Total live alerts across mounted surfaces.
    pub fn alerts_visible(&self) -> usize {
        self.surfaces
            .values()
            .map(|surface| match surface.state() {
                SurfaceState::Mounted { alerts_visible } => alerts_visible,
                SurfaceState::Unmounted => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::FeedTarget,
        test_helpers::{ScriptedEventSource, StreamInfoBuilder},
    };

    #[tokio::test]
    async fn test_reconcile_follows_directory() {
        let source = Arc::new(ScriptedEventSource::new());
        let hub = ChannelHub::new(source.clone(), Duration::from_millis(10), 16);
        let store = Arc::new(AlertStore::new(Duration::from_secs(5), Duration::from_secs(300)));
        let mut manager = SurfaceManager::new(
            hub.clone(),
            store.clone(),
            SurfaceSize::new(640.0, 360.0),
            Duration::from_millis(50),
        );

        let alice = StreamInfoBuilder::new("https://chaturbate.com/alice/").id(1).build();
        let bob = StreamInfoBuilder::new("https://stripchat.com/bob").id(2).build();

        assert_eq!(manager.reconcile(&StreamDirectory::new([alice.clone(), bob])).await, (2, 0));
        assert_eq!(hub.subscriber_count(FeedTarget::Detections), 2);
        assert!(matches!(
            manager.state("https://chaturbate.com/alice"),
            SurfaceState::Mounted { .. }
        ));

        assert_eq!(manager.reconcile(&StreamDirectory::new([alice])).await, (0, 1));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.state("https://stripchat.com/bob"), SurfaceState::Unmounted);
        assert_eq!(store.subscriber_count("https://stripchat.com/bob"), 0);

        manager.unmount_all().await;
        assert!(manager.is_empty());
        assert!(!hub.is_open(FeedTarget::Detections));
    }
}
