//! Session model returned by `GET /api/session`.

use serde::Deserialize;

/// Role of the logged-in operator.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees every stream and manages settings.
    Admin,
    /// Sees only assigned streams.
    Agent,
}

/// The logged-in user.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionUser {
    /// Operator role.
    pub role: Role,
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

/// Session state.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionInfo {
    /// Whether the cookie maps to a live session.
    pub logged_in: bool,
    /// The user, when logged in.
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl SessionInfo {
    /// The role of a logged-in session.
    pub fn role(&self) -> Option<Role> {
        if self.logged_in { self.user.as_ref().map(|u| u.role) } else { None }
    }
}
