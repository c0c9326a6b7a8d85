use std::sync::Arc;

use reqwest::{
    StatusCode,
    header::{ACCEPT, COOKIE},
};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use url::Url;

use super::{ApiError, BackendApi};
use crate::models::{
    AgentDashboardResponse, DashboardResponse, FlaggedObject, SessionInfo,
};

/// HTTP implementation of [`BackendApi`].
pub struct ApiClient {
    client: Arc<ClientWithMiddleware>,
    base_url: Url,
    session_cookie: Option<String>,
}

impl ApiClient {
    /// Creates a client resolving endpoint paths against `base_url`.
    pub fn new(
        client: Arc<ClientWithMiddleware>,
        base_url: Url,
        session_cookie: Option<String>,
    ) -> Self {
        Self { client, base_url, session_cookie }
    }

    async fn get(&self, path: &str) -> Result<(Url, reqwest::Response), ApiError> {
        let url = self.base_url.join(path)?;
        let mut request = self.client.get(url.clone()).header(ACCEPT, "application/json");
        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie);
        }
        tracing::debug!(%url, "Calling backend.");
        let response = request.send().await?;
        Ok((url, response))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (url, response) = self.get(path).await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized { status: status.as_u16(), url: url.to_string() });
        }
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl BackendApi for ApiClient {
    async fn session(&self) -> Result<SessionInfo, ApiError> {
        let (url, response) = self.get("api/session").await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(SessionInfo { logged_in: false, user: None });
        }
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(response.json().await?)
    }

    async fn dashboard(&self) -> Result<DashboardResponse, ApiError> {
        self.get_json("api/dashboard").await
    }

    async fn agent_dashboard(&self) -> Result<AgentDashboardResponse, ApiError> {
        self.get_json("api/agent/dashboard").await
    }

    async fn flagged_objects(&self) -> Result<Vec<FlaggedObject>, ApiError> {
        self.get_json("api/objects").await
    }
}
