//! This module contains the data models for streamwatch.

pub mod alert_state;
pub mod detection;
pub mod feed;
pub mod flagged_object;
pub mod notification;
pub mod session;
pub mod sink;
pub mod stream;

pub use alert_state::{DedupPolicy, ThrottlePolicy, ThrottleState};
pub use detection::{BoundingBox, BoundingBoxError, DetectionEvent, DetectionSource};
pub use feed::FeedTarget;
pub use flagged_object::{FlaggedObject, FlaggedObjects};
pub use notification::{
    Notification, NotificationDetails, NotificationFilter, NotificationId, NotificationKind, Toast,
};
pub use session::{Role, SessionInfo, SessionUser};
pub use sink::{AlertSinkConfig, StdoutSinkConfig, WebhookSinkConfig};
pub use stream::{
    AgentDashboardResponse, AgentInfo, DashboardResponse, PlatformKind, PlayerSource,
    StreamDirectory, StreamInfo,
};
