//! Client for the remote execution service.
//!
//! One call runs one code+stdin pair and returns the program's raw
//! output. Rate limiting is a distinct error kind so the retrying
//! invoker can tell it apart from transport and service failures.

use crate::retry::{retry_with_backoff, RetryError, RetryPolicy};
use clp_common::types::Language;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Failure modes of an execution call.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Network or timeout failure before a response arrived.
    #[error("execution service unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    /// HTTP 429; the only retriable kind.
    #[error("execution service rate limited the request")]
    RateLimited,
    /// Any other non-success status.
    #[error("execution service returned HTTP {status}")]
    Service { status: u16 },
    /// The retry budget was spent on rate limits.
    #[error("rate limit retries exhausted after {attempts} attempts")]
    MaxRetriesExceeded { attempts: u32 },
}

impl ExecutionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ExecutionError::RateLimited)
    }
}

/// One code+stdin execution request, shaped for `POST /compiler/run`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub script: String,
    pub language: Language,
    pub version_index: &'static str,
    pub stdin: String,
}

impl RunRequest {
    pub fn new(script: impl Into<String>, language: Language, stdin: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            language,
            version_index: language.version_index(),
            stdin: stdin.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    output: Option<String>,
}

pub struct CompilerClient {
    http: reqwest::Client,
    base_url: String,
}

impl CompilerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Execute once. No retry happens at this level.
    pub async fn run(&self, request: &RunRequest) -> Result<String, ExecutionError> {
        let response = self
            .http
            .post(format!("{}/compiler/run", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(ExecutionError::Transport)?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(ExecutionError::RateLimited),
            status if status.is_success() => {
                let body: RunResponse =
                    response.json().await.map_err(ExecutionError::Transport)?;
                Ok(body.output.unwrap_or_default())
            }
            status => Err(ExecutionError::Service {
                status: status.as_u16(),
            }),
        }
    }

    /// Execute with bounded retry on rate limiting. Transport and
    /// service errors propagate without retry.
    pub async fn run_with_retry(
        &self,
        request: &RunRequest,
        policy: &RetryPolicy,
    ) -> Result<String, ExecutionError> {
        retry_with_backoff(policy, ExecutionError::is_rate_limited, || self.run(request))
            .await
            .map_err(|e| match e {
                RetryError::Exhausted { attempts } => {
                    ExecutionError::MaxRetriesExceeded { attempts }
                }
                RetryError::Inner(inner) => inner,
            })
    }
}
