use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/targets: recently targeted players, most recent first.
pub async fn list_targets(State(app): State<AppState>) -> Json<Vec<String>> {
    Json(app.controller.recent_targets())
}
