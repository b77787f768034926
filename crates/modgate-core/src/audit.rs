use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::types::{ActionKind, ActionRequest, ErrorKind, ExecutionResult, Requestor};

// ---------------------------------------------------------------------------
// AuditRecord
// ---------------------------------------------------------------------------

/// One completed moderation attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub requestor: Requestor,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl AuditRecord {
    pub fn new(request: &ActionRequest, result: &ExecutionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            requestor: request.requestor.clone(),
            action: request.action,
            target: request.effective_target().map(str::to_string),
            reason: request
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            duration_minutes: request
                .duration_minutes
                .filter(|_| request.action.is_duration_scoped()),
            succeeded: result.succeeded,
            error_kind: result.error_kind.clone(),
            error_detail: result.error_detail.clone(),
        }
    }

    /// Target as shown to humans; global actions have none.
    pub fn target_label(&self) -> &str {
        self.target.as_deref().unwrap_or("N/A")
    }
}

// ---------------------------------------------------------------------------
// AuditSink
// ---------------------------------------------------------------------------

/// External channel that receives audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn deliver(&self, record: &AuditRecord) -> anyhow::Result<()>;
}

/// Writes each record as a structured `info` event. Used when no external
/// channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl AuditSink for TracingSink {
    async fn deliver(&self, record: &AuditRecord) -> anyhow::Result<()> {
        tracing::info!(
            audit_id = %record.id,
            requestor = %record.requestor.name,
            requestor_id = %record.requestor.id,
            action = %record.action,
            target = record.target_label(),
            succeeded = record.succeeded,
            error = record.error_detail.as_deref().unwrap_or(""),
            "audit"
        );
        Ok(())
    }
}

/// Keeps every delivered record in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn deliver(&self, record: &AuditRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AuditLogger
// ---------------------------------------------------------------------------

/// Best-effort forwarding of audit records.
///
/// The record is built synchronously; delivery runs as a detached task whose
/// failure is logged and dropped.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Build the record for `request`/`result` and spawn its delivery.
    ///
    /// Must be called from within a tokio runtime. The returned handle only
    /// exists so callers that care (tests) can wait for delivery.
    pub fn record(&self, request: &ActionRequest, result: &ExecutionResult) -> JoinHandle<()> {
        let record = AuditRecord::new(request, result);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.deliver(&record).await {
                tracing::warn!(
                    audit_id = %record.id,
                    action = %record.action,
                    error = %format!("{e:#}"),
                    "failed to deliver audit record"
                );
            }
        })
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn deliver(&self, _record: &AuditRecord) -> anyhow::Result<()> {
            anyhow::bail!("channel unavailable")
        }
    }

    fn kick_request() -> ActionRequest {
        ActionRequest::new(ActionKind::Kick, Requestor::local_admin("ops"))
            .with_target("Steve")
            .with_reason("Cheating")
    }

    #[test]
    fn record_copies_request_and_result() {
        let result = ExecutionResult::failure(ErrorKind::Timeout, "Request timeout");
        let record = AuditRecord::new(&kick_request(), &result);
        assert_eq!(record.action, ActionKind::Kick);
        assert_eq!(record.target.as_deref(), Some("Steve"));
        assert_eq!(record.reason.as_deref(), Some("Cheating"));
        assert!(!record.succeeded);
        assert_eq!(record.error_kind, Some(ErrorKind::Timeout));
        assert_eq!(record.error_detail.as_deref(), Some("Request timeout"));
    }

    #[test]
    fn global_action_record_has_no_target() {
        let request = ActionRequest::new(ActionKind::Freeze, Requestor::local_admin("ops"))
            .with_target("ignored")
            .with_duration(5);
        let record = AuditRecord::new(&request, &ExecutionResult::success("ok"));
        assert_eq!(record.target, None);
        assert_eq!(record.duration_minutes, None);
        assert_eq!(record.target_label(), "N/A");
    }

    #[tokio::test]
    async fn logger_delivers_to_sink() {
        let sink = MemorySink::new();
        let logger = AuditLogger::new(Arc::new(sink.clone()));
        logger
            .record(&kick_request(), &ExecutionResult::success("ok"))
            .await
            .unwrap();
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].succeeded);
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let logger = AuditLogger::new(Arc::new(FailingSink));
        let handle = logger.record(&kick_request(), &ExecutionResult::success("ok"));
        // The task completes normally rather than panicking.
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn tracing_sink_never_fails() {
        let record = AuditRecord::new(&kick_request(), &ExecutionResult::success("ok"));
        assert!(TracingSink.deliver(&record).await.is_ok());
    }
}
