//! A builder for creating `StreamInfo` instances in tests.

use crate::models::{AgentInfo, PlatformKind, StreamInfo};

/// A builder for creating `StreamInfo` instances in tests.
pub struct StreamInfoBuilder {
    id: i64,
    room_url: String,
    streamer_username: Option<String>,
    platform: Option<PlatformKind>,
    agent: Option<AgentInfo>,
    static_thumbnail: Option<String>,
    hls_url: Option<String>,
}

impl StreamInfoBuilder {
    /// Creates a new builder for the stream at `room_url`.
    pub fn new(room_url: &str) -> Self {
        Self {
            id: 1,
            room_url: room_url.to_string(),
            streamer_username: None,
            platform: None,
            agent: None,
            static_thumbnail: None,
            hls_url: None,
        }
    }

    /// Sets the backend id.
    pub fn id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Sets the streamer username.
    pub fn streamer(mut self, username: &str) -> Self {
        self.streamer_username = Some(username.to_string());
        self
    }

    /// Sets the platform.
    pub fn platform(mut self, platform: PlatformKind) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Assigns an agent by first and last name.
    pub fn agent(mut self, firstname: &str, lastname: &str) -> Self {
        self.agent = Some(AgentInfo {
            firstname: Some(firstname.to_string()),
            lastname: Some(lastname.to_string()),
            ..Default::default()
        });
        self
    }

    /// Sets the static thumbnail.
    pub fn static_thumbnail(mut self, url: &str) -> Self {
        self.static_thumbnail = Some(url.to_string());
        self
    }

    /// Sets the HLS playlist.
    pub fn hls_url(mut self, url: &str) -> Self {
        self.hls_url = Some(url.to_string());
        self
    }

    /// Builds the `StreamInfo` instance.
    pub fn build(self) -> StreamInfo {
        StreamInfo {
            id: self.id,
            room_url: self.room_url,
            streamer_username: self.streamer_username,
            platform: self.platform,
            agent: self.agent,
            static_thumbnail: self.static_thumbnail,
            hls_url: self.hls_url,
        }
    }
}
