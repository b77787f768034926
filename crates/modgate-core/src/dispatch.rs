use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{ErrorKind, ExecutionResult};

/// Sends rendered commands to the game server.
///
/// Implementations classify every outcome into an [`ExecutionResult`] and
/// never retry on their own.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn dispatch(&self, command: &str) -> ExecutionResult;

    /// Read-only resource and health query, used for the startup self-check.
    async fn query_status(&self) -> Result<ServerStatus, StatusFailure>;
}

/// A classified failure of the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl std::fmt::Display for StatusFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for StatusFailure {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub resources: ResourceUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    #[serde(default)]
    pub memory_bytes: u64,
    #[serde(default)]
    pub cpu_absolute: f64,
    #[serde(default)]
    pub disk_bytes: u64,
    #[serde(default)]
    pub network_rx_bytes: u64,
    #[serde(default)]
    pub network_tx_bytes: u64,
    #[serde(default)]
    pub uptime: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_status_tolerates_missing_fields() {
        let json = r#"{"current_state":"running","resources":{"memory_bytes":1024}}"#;
        let status: ServerStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.current_state.as_deref(), Some("running"));
        assert!(!status.is_suspended);
        assert_eq!(status.resources.memory_bytes, 1024);
        assert_eq!(status.resources.uptime, 0);
    }

    #[test]
    fn status_failure_display_includes_kind() {
        let failure = StatusFailure {
            kind: ErrorKind::AuthFailure,
            detail: "Authentication failed - check API key".into(),
        };
        assert_eq!(
            failure.to_string(),
            "auth_failure: Authentication failed - check API key"
        );
    }
}
