//! Client for the platform backend: login, question fetch, submission
//! persistence. Requests carry the bearer token when one is set; a 401
//! is its own error kind so callers can force re-authentication.

use clp_common::types::{Question, Role, SubmissionOutcome};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("platform API unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    /// The backend rejected the token; the session must be dropped.
    #[error("session rejected by the platform API")]
    Unauthorized,
    #[error("platform API returned HTTP {status}")]
    Status { status: u16 },
    #[error("platform API response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Credentials issued on a successful login. `user` stays opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: serde_json::Value,
}

pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = self
            .decorate(request)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(BackendError::Unauthorized),
            status if status.is_success() => Ok(response),
            status => Err(BackendError::Status {
                status: status.as_u16(),
            }),
        }
    }

    /// `POST /auth/{role}/login`. The role picks the endpoint; the
    /// backend decides whether the credentials belong to it.
    pub async fn login(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, BackendError> {
        let url = format!("{}/auth/{}/login", self.base_url, role.path_segment());
        let response = self
            .send(self.http.post(url).json(&LoginRequest { email, password }))
            .await?;
        response.json().await.map_err(BackendError::Decode)
    }

    /// `GET /coding/questions/{id}`.
    pub async fn question(&self, id: u64) -> Result<Question, BackendError> {
        let url = format!("{}/coding/questions/{}", self.base_url, id);
        let response = self.send(self.http.get(url)).await?;
        response.json().await.map_err(BackendError::Decode)
    }

    /// `POST /coding/submit`. The acknowledgement body is opaque.
    pub async fn submit(
        &self,
        outcome: &SubmissionOutcome,
    ) -> Result<serde_json::Value, BackendError> {
        let url = format!("{}/coding/submit", self.base_url);
        let response = self.send(self.http.post(url).json(outcome)).await?;
        response.json().await.map_err(BackendError::Decode)
    }
}
