use std::path::Path;
use std::sync::Arc;

use modgate_server::AppState;

use crate::wiring;

pub fn run(config_path: Option<&Path>, bind: Option<String>) -> anyhow::Result<()> {
    let config = wiring::load_valid_config(config_path)?;
    if config.operators.is_empty() {
        tracing::warn!("no operators configured; every API request will be rejected");
    }
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (controller, panel) = wiring::build_controller(&config)?;
        // Non-fatal: the panel may come up after us.
        panel.check_connection().await;

        let state = AppState::new(controller, Arc::new(config));
        let listener = tokio::net::TcpListener::bind(&bind).await?;

        tokio::select! {
            result = modgate_server::serve_on(state, listener) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
