//! Stream, platform and dashboard models used to enrich alerts.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::detection::canonical_stream_key;

/// Streaming platforms the console knows how to display.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    /// chaturbate.com
    Chaturbate,
    /// stripchat.com
    Stripchat,
}

/// How a stream's live video is played back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum PlayerSource {
    /// An iframe pointing at the platform's embed page.
    Embed(String),
    /// An HLS playlist played by a native player.
    Hls(String),
}

/// Per-platform rendering strategy.
pub struct PlatformStrategy {
    /// Builds the thumbnail URL. The timestamp busts caches for refreshing
    /// snapshots.
    pub thumbnail: fn(&StreamInfo, DateTime<Utc>) -> Option<String>,
    /// Picks the live player.
    pub player: fn(&StreamInfo) -> Option<PlayerSource>,
}

static CHATURBATE: PlatformStrategy =
    PlatformStrategy { thumbnail: chaturbate_thumbnail, player: chaturbate_player };

static STRIPCHAT: PlatformStrategy =
    PlatformStrategy { thumbnail: stripchat_thumbnail, player: stripchat_player };

fn chaturbate_thumbnail(stream: &StreamInfo, at: DateTime<Utc>) -> Option<String> {
    let room = stream.streamer()?;
    Some(format!("https://jpeg.live.mmcdn.com/stream?room={room}&t={}", at.timestamp_millis()))
}

fn chaturbate_player(stream: &StreamInfo) -> Option<PlayerSource> {
    let room = stream.streamer()?;
    Some(PlayerSource::Embed(format!("https://chaturbate.com/embed/{room}/?bgcolor=black")))
}

fn stripchat_thumbnail(stream: &StreamInfo, _at: DateTime<Utc>) -> Option<String> {
    stream.static_thumbnail.clone()
}

fn stripchat_player(stream: &StreamInfo) -> Option<PlayerSource> {
    stream.hls_url.clone().map(PlayerSource::Hls)
}

impl PlatformKind {
    /// Returns the rendering strategy for this platform.
    pub fn strategy(self) -> &'static PlatformStrategy {
        match self {
            PlatformKind::Chaturbate => &CHATURBATE,
            PlatformKind::Stripchat => &STRIPCHAT,
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Chaturbate => write!(f, "Chaturbate"),
            PlatformKind::Stripchat => write!(f, "Stripchat"),
        }
    }
}

/// Error returned when a platform name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformKind {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chaturbate" => Ok(PlatformKind::Chaturbate),
            "stripchat" => Ok(PlatformKind::Stripchat),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for PlatformKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Unknown or missing platforms become `None` instead of failing the whole
/// dashboard payload.
fn deserialize_lenient_platform<'de, D>(deserializer: D) -> Result<Option<PlatformKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(kind) => Some(kind),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unknown platform in dashboard payload.");
            None
        }
    }))
}

/// An agent as serialized by the backend.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct AgentInfo {
    /// Backend id.
    #[serde(default)]
    pub id: Option<i64>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// First name.
    #[serde(default)]
    pub firstname: Option<String>,
    /// Last name.
    #[serde(default)]
    pub lastname: Option<String>,
}

impl AgentInfo {
    /// "First Last" when both names are known, otherwise the username.
    pub fn display_name(&self) -> Option<String> {
        match (&self.firstname, &self.lastname) {
            (Some(first), Some(last)) if !first.is_empty() || !last.is_empty() => {
                Some(format!("{first} {last}").trim().to_string())
            }
            _ => self.username.clone(),
        }
    }
}

/// A monitored stream as returned by the dashboard endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StreamInfo {
    /// Backend id.
    pub id: i64,
    /// Room URL, which doubles as the stream key.
    pub room_url: String,
    /// Streamer username.
    #[serde(default)]
    pub streamer_username: Option<String>,
    /// Hosting platform.
    #[serde(default, deserialize_with = "deserialize_lenient_platform")]
    pub platform: Option<PlatformKind>,
    /// Assigned agent (admin dashboard only).
    #[serde(default)]
    pub agent: Option<AgentInfo>,
    /// Pre-rendered thumbnail (Stripchat).
    #[serde(default)]
    pub static_thumbnail: Option<String>,
    /// HLS playlist URL.
    #[serde(default, alias = "stripchat_m3u8_url", alias = "chaturbate_m3u8_url")]
    pub hls_url: Option<String>,
}

impl StreamInfo {
    /// Canonical stream key.
    pub fn stream_key(&self) -> String {
        canonical_stream_key(&self.room_url)
    }

    /// Streamer username, falling back to the last segment of the room URL.
    pub fn streamer(&self) -> Option<String> {
        self.streamer_username.clone().filter(|s| !s.is_empty()).or_else(|| {
            let key = self.stream_key();
            key.rsplit('/').next().filter(|s| !s.is_empty()).map(str::to_string)
        })
    }

    /// Thumbnail URL according to the platform strategy.
    pub fn thumbnail_url(&self, at: DateTime<Utc>) -> Option<String> {
        self.platform.and_then(|p| (p.strategy().thumbnail)(self, at))
    }

    /// Live player according to the platform strategy.
    pub fn player(&self) -> Option<PlayerSource> {
        self.platform.and_then(|p| (p.strategy().player)(self))
    }
}

/// Response of `GET /api/dashboard`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DashboardResponse {
    /// Number of streams currently monitored.
    #[serde(default)]
    pub ongoing_streams: usize,
    /// The streams with their assignment.
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
}

/// Response of `GET /api/agent/dashboard`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentDashboardResponse {
    /// Number of streams assigned to the agent.
    #[serde(default)]
    pub ongoing_streams: usize,
    /// The agent's streams.
    #[serde(default)]
    pub assignments: Vec<StreamInfo>,
}

/// Lookup from stream key to dashboard information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamDirectory {
    streams: HashMap<String, StreamInfo>,
}

impl StreamDirectory {
    /// Builds a directory keyed by canonical stream key.
    pub fn new(streams: impl IntoIterator<Item = StreamInfo>) -> Self {
        Self { streams: streams.into_iter().map(|s| (s.stream_key(), s)).collect() }
    }

    /// Looks up a stream by canonical key.
    pub fn get(&self, stream_key: &str) -> Option<&StreamInfo> {
        self.streams.get(stream_key)
    }

    /// All known stream keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.streams.keys()
    }

    /// Number of known streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl From<DashboardResponse> for StreamDirectory {
    fn from(value: DashboardResponse) -> Self {
        StreamDirectory::new(value.streams)
    }
}

impl From<AgentDashboardResponse> for StreamDirectory {
    fn from(value: AgentDashboardResponse) -> Self {
        StreamDirectory::new(value.assignments)
    }
}
