//! The console supervisor.
//!
//! [`Console`] owns every long-running piece of the alert engine and manages
//! its lifecycle:
//!
//! - **Initialization**: [`ConsoleBuilder`] wires the backend client, the
//!   event source, the channel hub, the alert store, the aggregator and the
//!   toast dispatcher together.
//! - **Collaborator refresh**: the stream directory and flagged objects are
//!   reloaded every `refresh_interval`; overlay surfaces are mounted and
//!   unmounted to follow the directory.
//! - **Notification pump**: the aggregate feed is fed to the aggregator and
//!   admitted toasts go to the dispatcher.
//! - **Graceful shutdown**: SIGINT or SIGTERM cancels every task; surfaces
//!   are unmounted within `shutdown_timeout`.

mod builder;
mod surfaces;

use std::sync::Arc;

pub use builder::ConsoleBuilder;
pub use surfaces::SurfaceManager;
use thiserror::Error;
use tokio::{signal, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    aggregator::NotificationAggregator,
    api::{ApiError, BackendApi},
    config::AppConfig,
    http_client::HttpClientPoolError,
    ingestion::ChannelHub,
    models::{FlaggedObjects, NotificationFilter, Role, StreamDirectory},
    overlay::SurfaceSize,
    sinks::{AlertDispatcher, AlertSinkError},
    store::AlertStore,
};

/// Errors that stop the console.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A required configuration was not provided to the `ConsoleBuilder`.
    #[error("Missing configuration for Console")]
    MissingConfig,

    /// The session cookie does not map to a logged-in user.
    #[error("Not logged in; set session_cookie to a valid console session")]
    NotLoggedIn,

    /// The backend could not be reached during startup.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// An HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpClientPoolError),

    /// A toast sink could not be built.
    #[error("Toast sink error: {0}")]
    Sink(#[from] AlertSinkError),
}

/// The primary runtime manager for the console.
pub struct Console {
    config: Arc<AppConfig>,
    api: Arc<dyn BackendApi>,
    hub: ChannelHub,
    store: Arc<AlertStore>,
    aggregator: Arc<NotificationAggregator>,
    dispatcher: Arc<AlertDispatcher>,
    cancellation_token: CancellationToken,
    join_set: JoinSet<()>,
}

impl Console {
    /// Creates a console from already-built components. Usually called by
    /// [`ConsoleBuilder::build`].
    pub fn new(
        config: AppConfig,
        api: Arc<dyn BackendApi>,
        hub: ChannelHub,
        aggregator: Arc<NotificationAggregator>,
        dispatcher: Arc<AlertDispatcher>,
    ) -> Self {
        let store = Arc::new(AlertStore::new(config.alert_ttl_ms, config.idle_eviction_secs));
        Self {
            config: Arc::new(config),
            api,
            hub,
            store,
            aggregator,
            dispatcher,
            cancellation_token: CancellationToken::new(),
            join_set: JoinSet::new(),
        }
    }

    /// Returns a new `ConsoleBuilder`.
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::new()
    }

    /// Token that stops the console when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// The session's notification aggregator.
    pub fn aggregator(&self) -> Arc<NotificationAggregator> {
        Arc::clone(&self.aggregator)
    }

    /// The live alert store.
    pub fn store(&self) -> Arc<AlertStore> {
        Arc::clone(&self.store)
    }

    /// Runs the console until a shutdown signal arrives or the cancellation
    /// token fires.
    pub async fn run(mut self) -> Result<(), ConsoleError> {
        let session = self.api.session().await?;
        let role = session.role().ok_or(ConsoleError::NotLoggedIn)?;
        tracing::info!(?role, "Session verified.");

        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to register SIGTERM handler.");
                        std::future::pending::<()>().await;
                    }
                }
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown.");
                }
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
                _ = cancellation_token.cancelled() => {}
            }
            cancellation_token.cancel();
        });

        // --- Collaborator refresh and overlay surfaces ---
        let api = Arc::clone(&self.api);
        let aggregator = Arc::clone(&self.aggregator);
        let mut surfaces = SurfaceManager::new(
            self.hub.clone(),
            Arc::clone(&self.store),
            SurfaceSize::new(self.config.surface_width, self.config.surface_height),
            self.config.render_cadence_ms,
        );
        let refresh_interval = self.config.refresh_interval_secs;
        let refresh_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            let mut ticker = tokio::time::interval(refresh_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = refresh_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let refreshed =
                            refresh_collaborators(api.as_ref(), &aggregator, role).await;
                        if let Some(directory) = refreshed {
                            surfaces.reconcile(&directory).await;
                        }
                    }
                }
            }
            surfaces.unmount_all().await;
            tracing::info!("Overlay surfaces unmounted.");
        });

        // --- Notification pump ---
        let mut subscription = self.hub.subscribe(self.config.aggregate_feed);
        let aggregator = Arc::clone(&self.aggregator);
        let dispatcher = Arc::clone(&self.dispatcher);
        let pump_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            loop {
                tokio::select! {
                    _ = pump_token.cancelled() => break,
                    next = subscription.recv() => {
                        let Some(event) = next else { break };
                        let alert = aggregator.on_detection_event(&event).await;
                        if let Some(toast) = alert.and_then(|alert| alert.toast) {
                            dispatcher.dispatch(&toast).await;
                        }
                    }
                }
            }
        });

        // --- Store eviction ---
        let store = Arc::clone(&self.store);
        let eviction_interval = self.config.eviction_check_interval_secs;
        let eviction_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            store.run_eviction(eviction_interval, eviction_token).await;
        });

        // --- Unread badge ---
        let mut unread = self.aggregator.subscribe_unread();
        let unread_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            loop {
                tokio::select! {
                    _ = unread_token.cancelled() => break,
                    changed = unread.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let count = *unread.borrow_and_update();
                        tracing::info!(unread = count, "Unread notifications changed.");
                    }
                }
            }
        });

        // --- Main supervisor loop ---
        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(())) => {}
                        Some(Err(e)) => {
                            tracing::error!(
                                error = %e,
                                "A console task failed. Initiating shutdown."
                            );
                            self.cancellation_token.cancel();
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        // --- Graceful shutdown ---
        let shutdown_timeout = self.config.shutdown_timeout;
        let drain = async {
            while let Some(result) = self.join_set.join_next().await {
                if let Err(e) = result {
                    tracing::error!(error = %e, "A console task failed during shutdown.");
                }
            }
        };
        if tokio::time::timeout(shutdown_timeout, drain).await.is_err() {
            tracing::warn!(
                timeout = ?shutdown_timeout,
                "Tasks did not stop within the shutdown timeout. Aborting the rest."
            );
        }
        self.join_set.shutdown().await;

        let notifications = self.aggregator.list(NotificationFilter::All).await.len();
        let unread = self.aggregator.unread_count().await;
        tracing::info!(notifications, unread, "Console shutdown complete.");
        Ok(())
    }
}

/// Reloads the stream directory and flagged objects and hands them to the
/// aggregator. Failures keep the previous state.
async fn refresh_collaborators(
    api: &dyn BackendApi,
    aggregator: &NotificationAggregator,
    role: Role,
) -> Option<StreamDirectory> {
    if role == Role::Admin {
        match api.flagged_objects().await {
            Ok(objects) => aggregator.update_flagged_objects(FlaggedObjects::new(objects)).await,
            Err(e) => tracing::warn!(error = %e, "Failed to refresh flagged objects."),
        }
    }

    let directory = match role {
        Role::Admin => api.dashboard().await.map(StreamDirectory::from),
        Role::Agent => api.agent_dashboard().await.map(StreamDirectory::from),
    };
    match directory {
        Ok(directory) => {
            tracing::debug!(streams = directory.len(), "Refreshed stream directory.");
            aggregator.update_directory(directory.clone()).await;
            Some(directory)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to refresh stream directory.");
            None
        }
    }
}
