use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{deserialize_duration_from_seconds, serialize_duration_to_seconds};

fn default_idle_per_host() -> usize {
    8
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(90)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_tcp_keepalive() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("streamwatch/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings of the underlying `reqwest` client shared by the REST
/// collaborators, the event feeds and the webhook sinks.
///
/// No overall request timeout is applied: feed responses stay open for the
/// whole session.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BaseHttpClientConfig {
    /// Idle connections kept per host.
    #[serde(default = "default_idle_per_host")]
    pub max_idle_per_host: usize,

    /// How long an idle pooled connection is kept, in seconds.
    #[serde(
        default = "default_idle_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub idle_timeout: Duration,

    /// Connect timeout, in seconds.
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub connect_timeout: Duration,

    /// TCP keepalive interval, in seconds. Keeps quiet feed connections from
    /// being dropped by intermediaries.
    #[serde(
        default = "default_tcp_keepalive",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub tcp_keepalive: Duration,

    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BaseHttpClientConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: default_idle_per_host(),
            idle_timeout: default_idle_timeout(),
            connect_timeout: default_connect_timeout(),
            tcp_keepalive: default_tcp_keepalive(),
            user_agent: default_user_agent(),
        }
    }
}
