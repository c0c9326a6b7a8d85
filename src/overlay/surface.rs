//! Mount lifecycle of a single overlay surface.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{Notify, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::{OverlayBox, SurfaceSize, render};
use crate::{
    ingestion::{ChannelHub, Subscription},
    models::{FeedTarget, detection::canonical_stream_key},
    store::AlertStore,
};

/// One rendered state of a surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    /// Stream the frame belongs to.
    pub stream_key: String,
    /// When the frame was rendered.
    pub rendered_at: DateTime<Utc>,
    /// Surface size used for the projection.
    pub size: SurfaceSize,
    /// Boxes to draw.
    pub boxes: Vec<OverlayBox>,
    /// Number of live alerts on the stream.
    pub alerts_visible: usize,
}

/// Lifecycle state of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Not attached to anything.
    Unmounted,
    /// Subscribed and rendering.
    Mounted {
        /// Live alerts in the latest frame.
        alerts_visible: usize,
    },
}

struct MountedTasks {
    cancel: CancellationToken,
    writer: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

/// A mounted overlay for one stream.
///
/// Mounting attaches to the alert store and subscribes to the detection feed.
/// A writer task records this stream's events; a ticker re-renders on every
/// tick of `cadence` and whenever an event is recorded, publishing frames on
/// a watch channel. Dropping a mounted surface tears it down without waiting.
pub struct OverlaySurface {
    stream_key: String,
    store: Arc<AlertStore>,
    size: watch::Sender<SurfaceSize>,
    frames: watch::Receiver<OverlayFrame>,
    tasks: Option<MountedTasks>,
}

impl OverlaySurface {
    /// Mounts a surface for `stream_key`. Must be called within a Tokio
    /// runtime.
    pub fn mount(
        stream_key: &str,
        size: SurfaceSize,
        hub: &ChannelHub,
        store: Arc<AlertStore>,
        cadence: Duration,
    ) -> Self {
        let stream_key = canonical_stream_key(stream_key);
        let now = Utc::now();
        store.attach(&stream_key, now);
        let subscription = hub.subscribe(FeedTarget::Detections);

        let cancel = CancellationToken::new();
        let dirty = Arc::new(Notify::new());
        let (size_tx, size_rx) = watch::channel(size);
        let (frame_tx, frame_rx) = watch::channel(OverlayFrame {
            stream_key: stream_key.clone(),
            rendered_at: now,
            size,
            boxes: Vec::new(),
            alerts_visible: 0,
        });

        let writer = tokio::spawn(run_writer(
            stream_key.clone(),
            subscription,
            Arc::clone(&store),
            Arc::clone(&dirty),
            cancel.clone(),
        ));
        let ticker = tokio::spawn(run_ticker(
            stream_key.clone(),
            Arc::clone(&store),
            size_rx,
            frame_tx,
            dirty,
            cadence,
            cancel.clone(),
        ));

        tracing::info!(stream = %stream_key, "Overlay surface mounted.");
        Self {
            stream_key,
            store,
            size: size_tx,
            frames: frame_rx,
            tasks: Some(MountedTasks { cancel, writer, ticker }),
        }
    }

    /// Canonical key of the stream this surface shows.
    pub fn stream_key(&self) -> &str {
        &self.stream_key
    }

    /// Changes the surface size. The next frame uses it.
    pub fn resize(&self, size: SurfaceSize) {
        self.size.send_replace(size);
    }

    /// Watches rendered frames.
    pub fn frames(&self) -> watch::Receiver<OverlayFrame> {
        self.frames.clone()
    }

    /// The most recently rendered frame.
    pub fn latest_frame(&self) -> OverlayFrame {
        self.frames.borrow().clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SurfaceState {
        match self.tasks {
            Some(_) => {
                SurfaceState::Mounted { alerts_visible: self.frames.borrow().alerts_visible }
            }
            None => SurfaceState::Unmounted,
        }
    }

    /// Stops both tasks, closes the feed subscription and releases the store
    /// slot. No store writes for this stream happen after it returns.
    pub async fn unmount(&mut self, now: DateTime<Utc>) {
        let Some(tasks) = self.tasks.take() else {
            return;
        };
        tasks.cancel.cancel();
        for (name, handle) in [("writer", tasks.writer), ("ticker", tasks.ticker)] {
            if let Err(e) = handle.await {
                tracing::error!(
                    stream = %self.stream_key,
                    task = name,
                    error = %e,
                    "Overlay task failed."
                );
            }
        }
        self.store.detach(&self.stream_key, now);
        tracing::info!(stream = %self.stream_key, "Overlay surface unmounted.");
    }
}

impl Drop for OverlaySurface {
    fn drop(&mut self) {
        if let Some(tasks) = self.tasks.take() {
            tasks.cancel.cancel();
            self.store.detach(&self.stream_key, Utc::now());
        }
    }
}

async fn run_writer(
    stream_key: String,
    mut subscription: Subscription,
    store: Arc<AlertStore>,
    dirty: Arc<Notify>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = subscription.recv() => match next {
                Some(event) if event.stream_key == stream_key => {
                    if store.record(event) {
                        dirty.notify_one();
                    }
                }
                Some(_) => {}
                None => break,
            }
        }
    }
}

async fn run_ticker(
    stream_key: String,
    store: Arc<AlertStore>,
    mut size: watch::Receiver<SurfaceSize>,
    frames: watch::Sender<OverlayFrame>,
    dirty: Arc<Notify>,
    cadence: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(cadence);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            _ = dirty.notified() => {}
            changed = size.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let now = Utc::now();
        let surface = *size.borrow();
        let events = store.active_for(&stream_key, now);
        let frame = OverlayFrame {
            stream_key: stream_key.clone(),
            rendered_at: now,
            size: surface,
            boxes: render(surface, &events),
            alerts_visible: events.len(),
        };
        frames.send_if_modified(|current| {
            let modified = current.boxes != frame.boxes
                || current.size != frame.size
                || current.alerts_visible != frame.alerts_visible;
            *current = frame;
            modified
        });
    }
}
