use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::status_for;
use crate::state::AppState;

/// GET /api/status: resource usage reported by the panel.
pub async fn get_status(State(app): State<AppState>) -> Response {
    match app.controller.dispatcher().query_status().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(failure) => {
            let code = status_for(Some(&failure.kind));
            (code, Json(failure)).into_response()
        }
    }
}
