use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Resolve `Authorization: Bearer <token>` to a configured operator.
///
/// On success the operator's [`Requestor`](modgate_core::types::Requestor) is
/// inserted into the request extensions. Whether that operator may issue a
/// given action is decided later by the controller's access policy.
pub async fn require_operator(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("");

    let Some(operator) = app.config.operator_by_token(token) else {
        return unauthorized();
    };
    let requestor = operator.requestor();
    req.extensions_mut().insert(requestor);
    next.run(req).await
}

fn unauthorized() -> Response {
    Response::builder()
        .status(401)
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"error":"unauthorized"}"#))
        .expect("infallible: all header values are valid ASCII")
}
