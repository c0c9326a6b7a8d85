use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{
    BaseHttpClientConfig, HttpRetryConfig, deserialize_base_url, deserialize_duration_from_ms,
    deserialize_duration_from_seconds,
};
use crate::models::{AlertSinkConfig, DedupPolicy, FeedTarget, ThrottlePolicy};

fn default_api_base_url() -> Url {
    Url::parse("http://127.0.0.1:5000/").expect("static default URL is valid")
}

fn default_alert_ttl() -> Duration {
    Duration::from_millis(5_000)
}

fn default_idle_eviction() -> Duration {
    Duration::from_secs(300)
}

fn default_eviction_check_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_render_cadence() -> Duration {
    Duration::from_millis(1_000)
}

fn default_reconnect_delay() -> Duration {
    Duration::from_millis(3_000)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_subscriber_channel_capacity() -> usize {
    1024
}

fn default_surface_width() -> f64 {
    1280.0
}

fn default_surface_height() -> f64 {
    720.0
}

fn default_aggregate_feed() -> FeedTarget {
    FeedTarget::Notifications
}

fn default_sinks() -> Vec<AlertSinkConfig> {
    vec![AlertSinkConfig::Stdout(Default::default())]
}

/// Application configuration for streamwatch.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Base URL of the console backend (REST API and event feeds).
    #[serde(deserialize_with = "deserialize_base_url", default = "default_api_base_url")]
    pub api_base_url: Url,

    /// Value of the `Cookie` header sent with every backend request.
    #[serde(default)]
    pub session_cookie: Option<String>,

    /// How long a detection stays visible on an overlay without being
    /// refreshed.
    #[serde(deserialize_with = "deserialize_duration_from_ms", default = "default_alert_ttl")]
    pub alert_ttl_ms: Duration,

    /// Idle time after which an unmounted stream's alert set is evicted.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_idle_eviction"
    )]
    pub idle_eviction_secs: Duration,

    /// How often the alert store looks for idle stream sets.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_eviction_check_interval"
    )]
    pub eviction_check_interval_secs: Duration,

    /// Toast throttling applied per stream.
    #[serde(default)]
    pub throttle: ThrottlePolicy,

    /// Recognition of redelivered detection events.
    #[serde(default)]
    pub dedup: DedupPolicy,

    /// Polling interval for the dashboard and flagged-object collaborators.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_refresh_interval"
    )]
    pub refresh_interval_secs: Duration,

    /// Overlay re-render cadence.
    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_render_cadence"
    )]
    pub render_cadence_ms: Duration,

    /// Delay before an event feed is reopened after the transport drops.
    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_reconnect_delay"
    )]
    pub reconnect_delay_ms: Duration,

    /// Queue size of each feed subscriber.
    #[serde(default = "default_subscriber_channel_capacity")]
    pub subscriber_channel_capacity: usize,

    /// Pixel width of mounted overlay surfaces.
    #[serde(default = "default_surface_width")]
    pub surface_width: f64,

    /// Pixel height of mounted overlay surfaces.
    #[serde(default = "default_surface_height")]
    pub surface_height: f64,

    /// The feed whose events are turned into notifications.
    #[serde(default = "default_aggregate_feed")]
    pub aggregate_feed: FeedTarget,

    /// The maximum time in seconds to wait for graceful shutdown.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,

    /// Retry policy for backend requests.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// Configuration for the base HTTP client.
    #[serde(default)]
    pub http_base_config: BaseHttpClientConfig,

    /// Destinations for transient alerts.
    #[serde(default = "default_sinks")]
    pub sinks: Vec<AlertSinkConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_cookie: None,
            alert_ttl_ms: default_alert_ttl(),
            idle_eviction_secs: default_idle_eviction(),
            eviction_check_interval_secs: default_eviction_check_interval(),
            throttle: ThrottlePolicy::default(),
            dedup: DedupPolicy::default(),
            refresh_interval_secs: default_refresh_interval(),
            render_cadence_ms: default_render_cadence(),
            reconnect_delay_ms: default_reconnect_delay(),
            subscriber_channel_capacity: default_subscriber_channel_capacity(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
            aggregate_feed: default_aggregate_feed(),
            shutdown_timeout: default_shutdown_timeout(),
            http_retry_config: HttpRetryConfig::default(),
            http_base_config: BaseHttpClientConfig::default(),
            sinks: default_sinks(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading `app.yaml` from the configuration
    /// directory, with `STREAMWATCH__` environment overrides on top.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{config_dir_str}/app.yaml")))
            .add_source(Environment::with_prefix("STREAMWATCH").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn api_base_url(mut self, url: &str) -> Self {
        self.config.api_base_url = Url::parse(url).unwrap();
        self
    }

    pub fn alert_ttl(mut self, ttl: Duration) -> Self {
        self.config.alert_ttl_ms = ttl;
        self
    }

    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval_secs = interval;
        self
    }

    pub fn render_cadence(mut self, cadence: Duration) -> Self {
        self.config.render_cadence_ms = cadence;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn sinks(mut self, sinks: Vec<AlertSinkConfig>) -> Self {
        self.config.sinks = sinks;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::File as StdFile, io::Write};

    use tempfile::tempdir;

    use super::*;

    fn write_app_yaml(contents: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let mut file = StdFile::create(dir.path().join("app.yaml")).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let dir = write_app_yaml("api_base_url: \"http://backend:5000\"\n");

        let config = AppConfig::new(dir.path().to_str()).unwrap();

        assert_eq!(config.api_base_url.as_str(), "http://backend:5000/");
        assert_eq!(config.alert_ttl_ms, Duration::from_secs(5));
        assert_eq!(config.idle_eviction_secs, Duration::from_secs(300));
        assert_eq!(config.throttle.max_count, 1);
        assert_eq!(config.throttle.time_window_secs, Duration::from_secs(60));
        assert_eq!(config.dedup, DedupPolicy::default());
        assert_eq!(config.aggregate_feed, FeedTarget::Notifications);
        assert_eq!(config.sinks, vec![AlertSinkConfig::Stdout(Default::default())]);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
api_base_url: "http://backend:5000/console"
session_cookie: "session=abc"
alert_ttl_ms: 2500
idle_eviction_secs: 60
throttle:
  max_count: 2
  time_window_secs: 30
dedup:
  content_window_secs: 5
render_cadence_ms: 250
aggregate_feed: detections
sinks:
  - webhook:
      url: "http://hooks.local/alerts"
"#;
        let dir = write_app_yaml(yaml);

        let config = AppConfig::new(dir.path().to_str()).unwrap();

        assert_eq!(config.session_cookie.as_deref(), Some("session=abc"));
        assert_eq!(config.alert_ttl_ms, Duration::from_millis(2500));
        assert_eq!(config.idle_eviction_secs, Duration::from_secs(60));
        assert_eq!(config.throttle.max_count, 2);
        assert_eq!(config.dedup.content_window_secs, Duration::from_secs(5));
        assert_eq!(config.dedup.retention_secs, Duration::from_secs(60));
        assert_eq!(config.render_cadence_ms, Duration::from_millis(250));
        assert_eq!(config.aggregate_feed, FeedTarget::Detections);
        assert!(matches!(config.sinks.as_slice(), [AlertSinkConfig::Webhook(_)]));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(AppConfig::new(dir.path().to_str()).is_err());
    }
}
