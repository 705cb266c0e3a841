use std::path::PathBuf;
use std::time::Duration;

/// Client configuration shared by the grader binary.
///
/// Values come from the environment with defaults matching the platform's
/// development setup; none of the retry/throttle numbers are meant to be
/// tuned per user, they protect the shared execution service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform API, e.g. `http://localhost:8080/api`.
    pub api_base_url: String,
    /// Per-request timeout for all HTTP calls.
    pub request_timeout: Duration,
    /// Total attempts (first call + retries) against the execution service.
    pub max_attempts: u32,
    /// Unit of the linear backoff: retry n waits n * this.
    pub backoff_unit: Duration,
    /// Unconditional pause after every test case.
    pub inter_case_delay: Duration,
    /// Directory holding the persisted session record.
    pub session_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration, honoring `CLP_API_URL` and `CLP_SESSION_DIR`.
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("CLP_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api".to_string());

        let session_dir = std::env::var("CLP_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(|home| PathBuf::from(home).join(".clp"))
                    .unwrap_or_else(|_| PathBuf::from(".clp"))
            });

        Self {
            api_base_url,
            session_dir,
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            request_timeout: Duration::from_secs(15),
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
            inter_case_delay: Duration::from_millis(200),
            session_dir: PathBuf::from(".clp"),
        }
    }
}
