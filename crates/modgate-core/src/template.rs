use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ModgateError, Result};
use crate::render::{self, RenderParams};
use crate::types::ActionKind;

// ---------------------------------------------------------------------------
// CommandTemplate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTemplate {
    pub action: ActionKind,
    pub pattern: String,
}

impl CommandTemplate {
    pub fn render(&self, params: &RenderParams) -> Result<String> {
        render::render(&self.pattern, params)
    }

    pub fn uses(&self, placeholder: &str) -> bool {
        render::placeholders(&self.pattern).contains(&placeholder)
    }
}

// ---------------------------------------------------------------------------
// TemplateViolation
// ---------------------------------------------------------------------------

/// A target-scoped action whose pattern cannot name its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateViolation {
    pub action: ActionKind,
    pub pattern: String,
}

impl fmt::Display for TemplateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command template for '{}' must include the {{target}} placeholder (current: '{}')",
            self.action, self.pattern
        )
    }
}

// ---------------------------------------------------------------------------
// TemplateRegistry
// ---------------------------------------------------------------------------

/// One pattern per action. Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<ActionKind, CommandTemplate>,
}

impl TemplateRegistry {
    pub fn load(mapping: BTreeMap<ActionKind, String>) -> Self {
        let templates = mapping
            .into_iter()
            .map(|(action, pattern)| (action, CommandTemplate { action, pattern }))
            .collect();
        Self { templates }
    }

    /// Registry holding the built-in pattern for every action.
    pub fn defaults() -> Self {
        Self::load(
            ActionKind::all()
                .iter()
                .map(|a| (*a, a.default_pattern().to_string()))
                .collect(),
        )
    }

    /// Load and refuse to return a registry that has any violation.
    pub fn load_validated(mapping: BTreeMap<ActionKind, String>) -> Result<Self> {
        let registry = Self::load(mapping);
        let violations = registry.validate();
        if violations.is_empty() {
            Ok(registry)
        } else {
            Err(ModgateError::ConfigValidation(
                violations.iter().map(ToString::to_string).collect(),
            ))
        }
    }

    /// Every target-scoped action whose pattern lacks `{target}`.
    pub fn validate(&self) -> Vec<TemplateViolation> {
        self.templates
            .values()
            .filter(|t| t.action.is_target_scoped() && !t.uses(render::TARGET))
            .map(|t| TemplateViolation {
                action: t.action,
                pattern: t.pattern.clone(),
            })
            .collect()
    }

    pub fn get(&self, action: ActionKind) -> Result<&CommandTemplate> {
        self.templates
            .get(&action)
            .ok_or_else(|| ModgateError::UnknownAction(action.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
