use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use modgate_core::error::ModgateError;
use modgate_core::types::{ActionKind, ActionRequest, ExecutionResult, Requestor};

use crate::error::{status_for, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl ActionBody {
    fn into_request(self, requestor: Requestor) -> Result<ActionRequest, ModgateError> {
        let action: ActionKind = self.action.parse()?;
        Ok(ActionRequest {
            action,
            target: self.target,
            reason: self.reason,
            duration_minutes: self.duration_minutes,
            requestor,
        })
    }
}

/// POST /api/actions: run one moderation action.
///
/// Always answers with an `ExecutionResult`; the HTTP status mirrors its
/// error kind.
pub async fn submit_action(
    State(app): State<AppState>,
    Extension(requestor): Extension<Requestor>,
    Json(body): Json<ActionBody>,
) -> (StatusCode, Json<ExecutionResult>) {
    let result = match body.into_request(requestor) {
        Ok(request) => app.controller.submit(request).await,
        // No ActionKind to audit against; the caller sees the failure directly.
        Err(e) => ExecutionResult::from_error(&e),
    };
    (status_for(result.error_kind.as_ref()), Json(result))
}

/// POST /api/actions/preview: render the command without sending it.
pub async fn preview_action(
    State(app): State<AppState>,
    Extension(requestor): Extension<Requestor>,
    Json(body): Json<ActionBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = body.into_request(requestor)?;
    let command = app.controller.preview(&request)?;
    Ok(Json(serde_json::json!({ "command": command })))
}
