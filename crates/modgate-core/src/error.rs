use thiserror::Error;

use crate::types::ErrorKind;

#[derive(Debug, Error)]
pub enum ModgateError {
    #[error("configuration is invalid:\n{}", format_violations(.0))]
    ConfigValidation(Vec<String>),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("template placeholder '{{{key}}}' has no value")]
    TemplateRender { key: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not authorized: {0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ModgateError {
    /// The per-request error kind this error surfaces as in a failed
    /// [`ExecutionResult`](crate::types::ExecutionResult).
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ModgateError::UnknownAction(_) => ErrorKind::UnknownAction,
            ModgateError::TemplateRender { .. } => ErrorKind::TemplateRender,
            ModgateError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ModgateError::Rejected(_) => ErrorKind::Rejected,
            _ => ErrorKind::InternalFailure,
        }
    }
}

fn format_violations(items: &[String]) -> String {
    items
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, ModgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_lists_every_violation() {
        let err = ModgateError::ConfigValidation(vec![
            "kick lacks {target}".into(),
            "panel.url must start with http:// or https://".into(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("  - kick lacks {target}"));
        assert!(msg.contains("  - panel.url must start"));
    }

    #[test]
    fn template_render_names_the_key() {
        let err = ModgateError::TemplateRender {
            key: "reason".into(),
        };
        assert_eq!(err.to_string(), "template placeholder '{reason}' has no value");
        assert_eq!(err.error_kind(), ErrorKind::TemplateRender);
    }
}
