use axum::extract::State;
use axum::Json;
use serde::Serialize;

use modgate_core::types::ActionKind;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TemplateView {
    pub action: ActionKind,
    pub pattern: String,
    pub target_scoped: bool,
    pub duration_scoped: bool,
    pub requires_reason: bool,
}

/// GET /api/templates: the effective command pattern for every action.
pub async fn list_templates(State(app): State<AppState>) -> Json<Vec<TemplateView>> {
    let views = app
        .controller
        .templates()
        .iter()
        .map(|t| TemplateView {
            action: t.action,
            pattern: t.pattern.clone(),
            target_scoped: t.action.is_target_scoped(),
            duration_scoped: t.action.is_duration_scoped(),
            requires_reason: t.action.requires_reason(),
        })
        .collect();
    Json(views)
}
