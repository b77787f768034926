use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::access::AccessPolicy;
use crate::error::{ModgateError, Result};
use crate::render;
use crate::template::TemplateRegistry;
use crate::types::{ActionKind, Requestor};

pub const DEFAULT_CONFIG_FILE: &str = "modgate.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PanelConfig
// ---------------------------------------------------------------------------

/// Where the remote command endpoint lives and how to authenticate to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_status_timeout_secs() -> u64 {
    10
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            server_id: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            status_timeout_secs: default_status_timeout_secs(),
        }
    }
}

impl PanelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// AuditConfig / ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// ---------------------------------------------------------------------------
// OperatorConfig
// ---------------------------------------------------------------------------

/// An operator allowed to call the HTTP API, identified by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub administrator: bool,
}

impl OperatorConfig {
    pub fn requestor(&self) -> Requestor {
        Requestor {
            id: self.id.clone().unwrap_or_else(|| self.name.clone()),
            name: self.name.clone(),
            roles: self.roles.clone(),
            administrator: self.administrator,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub panel: PanelConfig,
    /// Pattern overrides keyed by action name; merged over the defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, String>,
    #[serde(default)]
    pub access: AccessPolicy,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<OperatorConfig>,
}

impl Config {
    pub fn from_yaml(data: &str) -> Result<Self> {
        let mut cfg: Config = serde_yaml::from_str(data)?;
        cfg.normalize();
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModgateError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    /// Load `path`, then apply environment overrides read through `lookup`.
    ///
    /// A missing file is only an error when `required` is set; otherwise the
    /// configuration comes from the environment alone.
    pub fn resolve<F>(path: &Path, required: bool, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match Self::load(path) {
            Ok(cfg) => cfg,
            Err(ModgateError::ConfigNotFound(_)) if !required => Self::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env(lookup);
        Ok(cfg)
    }

    /// Apply the environment variable overrides.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("PTERODACTYL_API_URL") {
            self.panel.url = url;
        }
        if let Some(key) = get("PTERODACTYL_API_KEY") {
            self.panel.api_key = key;
        }
        if let Some(id) = get("PTERODACTYL_SERVER_ID") {
            self.panel.server_id = id;
        }
        if let Some(role) = get("ADMIN_ROLE").or_else(|| get("ADMIN_ROLE_ID")) {
            self.access.admin_role = Some(role);
        }
        if let Some(url) = get("AUDIT_WEBHOOK_URL") {
            self.audit.webhook_url = Some(url);
        }
        for action in ActionKind::all() {
            let key = format!("CMD_{}", action.as_str().to_ascii_uppercase());
            let value = get(&key).or_else(|| {
                (*action == ActionKind::Ban)
                    .then(|| get("CMD_IPBAN"))
                    .flatten()
            });
            if let Some(pattern) = value {
                self.commands.insert(action.as_str().to_string(), pattern);
            }
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let trimmed = self.panel.url.trim().trim_end_matches('/').to_string();
        self.panel.url = trimmed;
    }

    /// Registry holding the defaults with every recognised override applied.
    ///
    /// Unknown action names are skipped here and reported by [`validate`](Self::validate).
    pub fn templates(&self) -> TemplateRegistry {
        let mut mapping: BTreeMap<ActionKind, String> = ActionKind::all()
            .iter()
            .map(|a| (*a, a.default_pattern().to_string()))
            .collect();
        for (name, pattern) in &self.commands {
            if let Ok(action) = name.parse::<ActionKind>() {
                mapping.insert(action, pattern.clone());
            }
        }
        TemplateRegistry::load(mapping)
    }

    pub fn operator_by_token(&self, token: &str) -> Option<&OperatorConfig> {
        if token.is_empty() {
            return None;
        }
        self.operators.iter().find(|op| op.token == token)
    }

    pub fn operator_by_name(&self, name: &str) -> Option<&OperatorConfig> {
        self.operators.iter().find(|op| op.name == name)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Every finding, not just the first.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // 1. Panel connection
        if !is_http_url(&self.panel.url) {
            warnings.push(ConfigWarning::error(
                "panel.url must start with http:// or https:// (PTERODACTYL_API_URL)",
            ));
        }
        if self.panel.server_id.trim().is_empty() {
            warnings.push(ConfigWarning::error(
                "panel.server_id is not set (PTERODACTYL_SERVER_ID)",
            ));
        }
        if self.panel.api_key.trim().is_empty() {
            warnings.push(ConfigWarning::error(
                "panel.api_key is not set (PTERODACTYL_API_KEY)",
            ));
        }
        if self.panel.timeout_secs == 0 {
            warnings.push(ConfigWarning::error("panel.timeout_secs must be greater than 0"));
        }
        if self.panel.status_timeout_secs == 0 {
            warnings.push(ConfigWarning::error(
                "panel.status_timeout_secs must be greater than 0",
            ));
        }

        // 2. Command templates
        for name in self.commands.keys() {
            if name.parse::<ActionKind>().is_err() {
                warnings.push(ConfigWarning::warning(format!(
                    "unknown action '{name}' in commands"
                )));
            }
        }
        let registry = self.templates();
        for violation in registry.validate() {
            warnings.push(ConfigWarning::error(violation.to_string()));
        }
        for template in registry.iter() {
            for name in render::placeholders(&template.pattern) {
                if ![render::TARGET, render::REASON, render::DURATION].contains(&name) {
                    warnings.push(ConfigWarning::error(format!(
                        "command template for '{}' uses unknown placeholder {{{name}}} (current: '{}')",
                        template.action, template.pattern
                    )));
                }
            }
            if !template.action.is_target_scoped() && template.uses(render::TARGET) {
                warnings.push(ConfigWarning::error(format!(
                    "command template for '{}' uses {{target}} but the action takes no target",
                    template.action
                )));
            }
            if !template.action.is_duration_scoped() && template.uses(render::DURATION) {
                warnings.push(ConfigWarning::error(format!(
                    "command template for '{}' uses {{duration}} but the action takes no duration",
                    template.action
                )));
            }
            if template.action.is_duration_scoped() && !template.uses(render::DURATION) {
                warnings.push(ConfigWarning::warning(format!(
                    "command template for '{}' does not use {{duration}}; the ban length will be dropped",
                    template.action
                )));
            }
            if template.action.requires_reason() && !template.uses(render::REASON) {
                warnings.push(ConfigWarning::warning(format!(
                    "command template for '{}' does not use {{reason}}; the reason will only appear in the audit log",
                    template.action
                )));
            }
        }

        // 3. Operators
        let mut seen = HashSet::new();
        for op in &self.operators {
            if op.token.trim().is_empty() {
                warnings.push(ConfigWarning::error(format!(
                    "operator '{}' has an empty token",
                    op.name
                )));
            } else if !seen.insert(op.token.as_str()) {
                warnings.push(ConfigWarning::error(format!(
                    "operator '{}' reuses a token already assigned to another operator",
                    op.name
                )));
            }
        }

        // 4. Audit and server
        if let Some(url) = &self.audit.webhook_url {
            if !is_http_url(url) {
                warnings.push(ConfigWarning::error(
                    "audit.webhook_url must start with http:// or https:// (AUDIT_WEBHOOK_URL)",
                ));
            }
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            warnings.push(ConfigWarning::error(format!(
                "server.bind '{}' is not a socket address",
                self.server.bind
            )));
        }

        warnings
    }

    /// Fail with every error-level finding.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ModgateError::ConfigValidation(errors))
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
