use std::sync::Arc;

use modgate_core::config::Config;
use modgate_core::controller::ActionController;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: ActionController,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(controller: ActionController, config: Arc<Config>) -> Self {
        Self { controller, config }
    }
}
