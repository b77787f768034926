use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::access::AccessPolicy;
use crate::audit::AuditLogger;
use crate::dispatch::CommandDispatcher;
use crate::error::{ModgateError, Result};
use crate::render::{self, RenderParams};
use crate::targets::RecentTargets;
use crate::template::TemplateRegistry;
use crate::types::{ActionRequest, ErrorKind, ExecutionResult};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Where a request is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Authorized,
    Rendered,
    Dispatched,
    Logged,
    Completed,
    Rejected,
    Failed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Authorized => "authorized",
            Stage::Rendered => "rendered",
            Stage::Dispatched => "dispatched",
            Stage::Logged => "logged",
            Stage::Completed => "completed",
            Stage::Rejected => "rejected",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A finished request plus the detached audit delivery it started.
pub struct Submission {
    pub result: ExecutionResult,
    pub stage: Stage,
    pub audit: JoinHandle<()>,
}

// ---------------------------------------------------------------------------
// ActionController
// ---------------------------------------------------------------------------

/// Runs one moderation request end to end:
/// authorize, render, dispatch, remember the target, audit.
///
/// Cheap to clone; every clone shares the same registry, dispatcher, cache
/// and audit sink. Concurrent submissions only contend on the recent-target
/// lock, which is never held across the dispatch.
#[derive(Clone)]
pub struct ActionController {
    templates: Arc<TemplateRegistry>,
    dispatcher: Arc<dyn CommandDispatcher>,
    targets: Arc<RecentTargets>,
    audit: AuditLogger,
    access: AccessPolicy,
}

impl ActionController {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        dispatcher: Arc<dyn CommandDispatcher>,
        targets: Arc<RecentTargets>,
        audit: AuditLogger,
        access: AccessPolicy,
    ) -> Self {
        Self {
            templates,
            dispatcher,
            targets,
            audit,
            access,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn recent_targets(&self) -> Vec<String> {
        self.targets.list()
    }

    pub fn dispatcher(&self) -> &Arc<dyn CommandDispatcher> {
        &self.dispatcher
    }

    /// The single entry point for every front end.
    pub async fn submit(&self, request: ActionRequest) -> ExecutionResult {
        self.submit_tracked(request).await.result
    }

    /// Like [`submit`](Self::submit), but hands back the audit task too.
    pub async fn submit_tracked(&self, request: ActionRequest) -> Submission {
        let action = request.action;
        tracing::debug!(
            action = %action,
            requestor = %request.requestor.name,
            stage = %Stage::Received
        );

        if let Err(reason) = self.access.authorize(&request.requestor) {
            tracing::warn!(
                action = %action,
                requestor = %request.requestor.name,
                stage = %Stage::Rejected,
                "{reason}"
            );
            let result = ExecutionResult::failure(ErrorKind::Rejected, reason);
            return self.finish(&request, result, Stage::Rejected);
        }
        tracing::debug!(action = %action, stage = %Stage::Authorized);

        let command = match self.render(&request) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(
                    action = %action,
                    stage = %Stage::Failed,
                    error = %e,
                    "request not dispatched"
                );
                let result = ExecutionResult::from_error(&e);
                return self.finish(&request, result, Stage::Failed);
            }
        };
        tracing::debug!(action = %action, stage = %Stage::Rendered, command = %command);

        let result = self.dispatcher.dispatch(&command).await;
        tracing::info!(
            action = %action,
            target = request.effective_target().unwrap_or("-"),
            succeeded = result.succeeded,
            error_kind = result.error_kind.as_ref().map(ErrorKind::as_str).unwrap_or("-"),
            stage = %Stage::Dispatched,
            "dispatched"
        );

        if result.succeeded {
            if let Some(target) = request.effective_target() {
                self.targets.record(target);
            }
        }

        let stage = if result.succeeded {
            Stage::Completed
        } else {
            Stage::Failed
        };
        self.finish(&request, result, stage)
    }

    /// Authorize, validate and render without dispatching.
    pub fn preview(&self, request: &ActionRequest) -> Result<String> {
        self.access
            .authorize(&request.requestor)
            .map_err(ModgateError::Rejected)?;
        self.render(request)
    }

    fn render(&self, request: &ActionRequest) -> Result<String> {
        request.validate()?;
        let template = self.templates.get(request.action)?;
        template.render(&params_for(request))
    }

    fn finish(
        &self,
        request: &ActionRequest,
        result: ExecutionResult,
        stage: Stage,
    ) -> Submission {
        let audit = self.audit.record(request, &result);
        tracing::debug!(action = %request.action, stage = %Stage::Logged);
        tracing::debug!(action = %request.action, stage = %stage, succeeded = result.succeeded);
        Submission {
            result,
            stage,
            audit,
        }
    }
}

impl fmt::Debug for ActionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionController")
            .field("templates", &self.templates.len())
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// Render parameters for the fields the action actually uses.
fn params_for(request: &ActionRequest) -> RenderParams {
    let mut params = RenderParams::new();
    if let Some(target) = request.effective_target() {
        params = params.set(render::TARGET, target);
    }
    if let Some(reason) = request.reason.as_deref().map(str::trim) {
        if !reason.is_empty() {
            params = params.set(render::REASON, reason);
        }
    }
    if let Some(minutes) = request.duration_minutes {
        params = params.set(render::DURATION, minutes.to_string());
    }
    params
}
