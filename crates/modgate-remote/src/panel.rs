//! Client for the game panel's client API (`/api/client/servers/{id}/...`).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use modgate_core::config::PanelConfig;
use modgate_core::dispatch::{CommandDispatcher, ServerStatus, StatusFailure};
use modgate_core::types::{ErrorKind, ExecutionResult};

pub const SUCCESS_MESSAGE: &str = "Command executed successfully";

// ---------------------------------------------------------------------------
// PanelSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub base_url: String,
    pub server_id: String,
    pub api_key: String,
    pub timeout: Duration,
    pub status_timeout: Duration,
}

impl PanelSettings {
    pub fn new(
        base_url: impl Into<String>,
        server_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            server_id: server_id.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            status_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeouts(mut self, timeout: Duration, status_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.status_timeout = status_timeout;
        self
    }
}

impl From<&PanelConfig> for PanelSettings {
    fn from(cfg: &PanelConfig) -> Self {
        Self::new(&cfg.url, &cfg.server_id, &cfg.api_key)
            .with_timeouts(cfg.timeout(), cfg.status_timeout())
    }
}

// ---------------------------------------------------------------------------
// PanelClient
// ---------------------------------------------------------------------------

/// Sends console commands to one server and classifies every outcome.
///
/// Holds a single pooled HTTP client. Nothing is retried.
#[derive(Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    settings: PanelSettings,
}

impl std::fmt::Debug for PanelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelClient")
            .field("base_url", &self.settings.base_url)
            .field("server_id", &self.settings.server_id)
            .finish_non_exhaustive()
    }
}

impl PanelClient {
    pub fn new(settings: PanelSettings) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|_| anyhow::anyhow!("panel api key contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    fn endpoint(&self, leaf: &str) -> String {
        format!(
            "{}/api/client/servers/{}/{leaf}",
            self.settings.base_url, self.settings.server_id
        )
    }

    /// Startup self-check. Logs the outcome and never fails.
    pub async fn check_connection(&self) -> bool {
        tracing::info!(url = %self.settings.base_url, "testing panel API connection");
        match self.query_status().await {
            Ok(status) => {
                tracing::info!(
                    state = status.current_state.as_deref().unwrap_or("unknown"),
                    "panel API connection successful"
                );
                true
            }
            Err(failure) => {
                tracing::error!(
                    error_kind = %failure.kind,
                    "panel API connection failed: {}",
                    failure.detail
                );
                false
            }
        }
    }
}

#[async_trait]
impl CommandDispatcher for PanelClient {
    async fn dispatch(&self, command: &str) -> ExecutionResult {
        let response = self
            .http
            .post(self.endpoint("command"))
            .json(&serde_json::json!({ "command": command }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let (kind, detail) = classify_transport(&e);
                tracing::error!(error_kind = %kind, "{detail}");
                return ExecutionResult::failure(kind, detail);
            }
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            tracing::info!(status = status.as_u16(), "command sent successfully");
            return ExecutionResult::success(SUCCESS_MESSAGE);
        }

        let body = read_body(response).await;
        let (kind, detail) = classify_status(status, body, &self.settings.server_id);
        tracing::error!(status = status.as_u16(), error_kind = %kind, "{detail}");
        ExecutionResult::failure(kind, detail)
    }

    async fn query_status(&self) -> Result<ServerStatus, StatusFailure> {
        let response = self
            .http
            .get(self.endpoint("resources"))
            .timeout(self.settings.status_timeout)
            .send()
            .await
            .map_err(|e| {
                let (kind, detail) = classify_transport(&e);
                StatusFailure { kind, detail }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = read_body(response).await;
            let (kind, detail) = classify_status(status, body, &self.settings.server_id);
            tracing::error!(
                status = status.as_u16(),
                error_kind = %kind,
                "failed to get server status: {detail}"
            );
            return Err(StatusFailure { kind, detail });
        }

        let bytes = response.bytes().await.map_err(|e| {
            let (kind, detail) = classify_transport(&e);
            StatusFailure { kind, detail }
        })?;
        let envelope: ResourcesEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| StatusFailure {
                kind: ErrorKind::InternalFailure,
                detail: format!("Unexpected error: status response was not understood: {e}"),
            })?;
        Ok(envelope.attributes)
    }
}

#[derive(Debug, Deserialize)]
struct ResourcesEnvelope {
    #[serde(default)]
    attributes: ServerStatus,
}

async fn read_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Map a non-success HTTP status onto the error taxonomy.
pub fn classify_status(status: StatusCode, body: String, server_id: &str) -> (ErrorKind, String) {
    match status {
        StatusCode::UNAUTHORIZED => (
            ErrorKind::AuthFailure,
            "Authentication failed - check API key".to_string(),
        ),
        StatusCode::FORBIDDEN => (
            ErrorKind::PermissionDenied,
            "Permission denied - API key lacks required permissions".to_string(),
        ),
        StatusCode::NOT_FOUND => (
            ErrorKind::TargetNotFound,
            format!("Server not found - check server ID: {server_id}"),
        ),
        other => {
            let detail = format!("API returned status {}: {body}", other.as_u16());
            (
                ErrorKind::UnexpectedStatus {
                    status: other.as_u16(),
                    body,
                },
                detail,
            )
        }
    }
}

/// Map a transport fault onto the error taxonomy.
pub fn classify_transport(err: &reqwest::Error) -> (ErrorKind, String) {
    if err.is_timeout() {
        (
            ErrorKind::Timeout,
            "Request timeout - server took too long to respond".to_string(),
        )
    } else if err.is_builder() {
        (ErrorKind::InternalFailure, format!("Unexpected error: {err}"))
    } else {
        (ErrorKind::NetworkFailure, format!("Network error: {err}"))
    }
}
