use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modgate_core::access::AccessPolicy;
use modgate_core::audit::{AuditLogger, AuditSink, TracingSink};
use modgate_core::config::{Config, DEFAULT_CONFIG_FILE};
use modgate_core::controller::ActionController;
use modgate_core::targets::RecentTargets;
use modgate_remote::{PanelClient, PanelSettings, WebhookSink};

/// Load the config file (if any) and apply environment overrides.
///
/// An explicitly named file must exist; the default `modgate.yaml` is
/// optional so the whole configuration can come from the environment.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    Config::resolve(&path, required, |key| std::env::var(key).ok())
        .with_context(|| format!("failed to load config from {}", path.display()))
}

/// Load and refuse to continue with any error-level finding.
pub fn load_valid_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = load_config(path)?;
    config.ensure_valid()?;
    Ok(config)
}

pub fn panel_client(config: &Config) -> anyhow::Result<PanelClient> {
    PanelClient::new(PanelSettings::from(&config.panel)).context("failed to build panel client")
}

fn audit_sink(config: &Config) -> anyhow::Result<Arc<dyn AuditSink>> {
    match &config.audit.webhook_url {
        Some(url) => Ok(Arc::new(WebhookSink::new(url.clone())?)),
        None => Ok(Arc::new(TracingSink)),
    }
}

/// Wire the full pipeline from a validated config.
pub fn build_controller(config: &Config) -> anyhow::Result<(ActionController, PanelClient)> {
    let panel = panel_client(config)?;
    let controller = ActionController::new(
        Arc::new(config.templates()),
        Arc::new(panel.clone()),
        Arc::new(RecentTargets::default()),
        AuditLogger::new(audit_sink(config)?),
        AccessPolicy::new(config.access.admin_role.clone()),
    );
    Ok((controller, panel))
}
