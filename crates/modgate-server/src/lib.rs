pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Actions
        .route("/api/actions", post(routes::actions::submit_action))
        .route(
            "/api/actions/preview",
            post(routes::actions::preview_action),
        )
        // Lookups
        .route("/api/targets", get(routes::targets::list_targets))
        .route("/api/templates", get(routes::templates::list_templates))
        .route("/api/status", get(routes::status::get_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_operator,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind` and serve the moderation API until the process exits.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    serve_on(state, listener).await
}

/// Serve on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful with port 0).
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(state);

    tracing::info!("modgate API listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
