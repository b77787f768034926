use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModgateError, Result};

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Kill,
    Kick,
    Tempban,
    #[serde(alias = "ipban")]
    Ban,
    Mute,
    Warn,
    Freeze,
    Unfreeze,
}

impl ActionKind {
    pub fn all() -> &'static [ActionKind] {
        &[
            ActionKind::Kill,
            ActionKind::Kick,
            ActionKind::Tempban,
            ActionKind::Ban,
            ActionKind::Mute,
            ActionKind::Warn,
            ActionKind::Freeze,
            ActionKind::Unfreeze,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Kill => "kill",
            ActionKind::Kick => "kick",
            ActionKind::Tempban => "tempban",
            ActionKind::Ban => "ban",
            ActionKind::Mute => "mute",
            ActionKind::Warn => "warn",
            ActionKind::Freeze => "freeze",
            ActionKind::Unfreeze => "unfreeze",
        }
    }

    /// Applies to one named player and needs a `{target}`.
    pub fn is_target_scoped(self) -> bool {
        !matches!(self, ActionKind::Freeze | ActionKind::Unfreeze)
    }

    pub fn is_duration_scoped(self) -> bool {
        matches!(self, ActionKind::Tempban)
    }

    pub fn requires_reason(self) -> bool {
        matches!(
            self,
            ActionKind::Kick
                | ActionKind::Tempban
                | ActionKind::Ban
                | ActionKind::Mute
                | ActionKind::Warn
        )
    }

    /// The command pattern used when the configuration does not override it.
    pub fn default_pattern(self) -> &'static str {
        match self {
            ActionKind::Kill => "kill {target}",
            ActionKind::Kick => "kick {target} {reason}",
            ActionKind::Tempban => "tempban {target} {duration}m {reason}",
            ActionKind::Ban => "ban {target} {reason}",
            ActionKind::Mute => "mute {target} {reason}",
            ActionKind::Warn => "warn {target} {reason}",
            ActionKind::Freeze => "tick freeze",
            ActionKind::Unfreeze => "tick unfreeze",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = ModgateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kill" => Ok(ActionKind::Kill),
            "kick" => Ok(ActionKind::Kick),
            "tempban" => Ok(ActionKind::Tempban),
            "ban" | "ipban" => Ok(ActionKind::Ban),
            "mute" => Ok(ActionKind::Mute),
            "warn" => Ok(ActionKind::Warn),
            "freeze" => Ok(ActionKind::Freeze),
            "unfreeze" => Ok(ActionKind::Unfreeze),
            _ => Err(ModgateError::UnknownAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Requestor
// ---------------------------------------------------------------------------

/// The operator on whose behalf an action runs.
///
/// Front ends authenticate the operator before building a request; the
/// controller only checks the capability carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requestor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub administrator: bool,
}

impl Requestor {
    /// A local administrator, e.g. someone running the CLI on the host.
    pub fn local_admin(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("local:{name}"),
            name,
            roles: Vec::new(),
            administrator: true,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

// ---------------------------------------------------------------------------
// ActionRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub requestor: Requestor,
}

impl ActionRequest {
    pub fn new(action: ActionKind, requestor: Requestor) -> Self {
        Self {
            action,
            target: None,
            reason: None,
            duration_minutes: None,
            requestor,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Check the per-action field requirements.
    ///
    /// Fields an action does not use are ignored rather than rejected.
    pub fn validate(&self) -> Result<()> {
        let action = self.action;

        if action.is_target_scoped() {
            let target = non_blank(self.target.as_deref()).ok_or_else(|| {
                ModgateError::InvalidRequest(format!("'{action}' requires a target"))
            })?;
            if target.chars().any(char::is_whitespace) {
                return Err(ModgateError::InvalidRequest(format!(
                    "target '{target}' must not contain whitespace"
                )));
            }
            reject_control_chars("target", target)?;
        }

        if action.is_duration_scoped() {
            match self.duration_minutes {
                Some(m) if m > 0 => {}
                Some(_) => {
                    return Err(ModgateError::InvalidRequest(format!(
                        "'{action}' requires a duration greater than zero"
                    )))
                }
                None => {
                    return Err(ModgateError::InvalidRequest(format!(
                        "'{action}' requires a duration in minutes"
                    )))
                }
            }
        }

        if action.requires_reason() {
            non_blank(self.reason.as_deref()).ok_or_else(|| {
                ModgateError::InvalidRequest(format!("'{action}' requires a reason"))
            })?;
        }
        // Any template may use {reason}, whether or not the action demands one.
        if let Some(reason) = self.reason.as_deref() {
            reject_control_chars("reason", reason)?;
        }

        Ok(())
    }

    /// The trimmed target, when the action uses one.
    pub fn effective_target(&self) -> Option<&str> {
        if self.action.is_target_scoped() {
            non_blank(self.target.as_deref())
        } else {
            None
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// A newline would let one request smuggle a second console command.
fn reject_control_chars(field: &str, value: &str) -> Result<()> {
    if value.chars().any(char::is_control) {
        return Err(ModgateError::InvalidRequest(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ErrorKind / ExecutionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    Rejected,
    InvalidRequest,
    UnknownAction,
    TemplateRender,
    AuthFailure,
    PermissionDenied,
    TargetNotFound,
    UnexpectedStatus { status: u16, body: String },
    NetworkFailure,
    Timeout,
    InternalFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Rejected => "rejected",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::UnknownAction => "unknown_action",
            ErrorKind::TemplateRender => "template_render",
            ErrorKind::AuthFailure => "auth_failure",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::TargetNotFound => "target_not_found",
            ErrorKind::UnexpectedStatus { .. } => "unexpected_status",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InternalFailure => "internal_failure",
        }
    }

    /// True for outcomes produced by the remote endpoint or the transport,
    /// as opposed to requests refused before dispatch.
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            ErrorKind::Rejected
                | ErrorKind::InvalidRequest
                | ErrorKind::UnknownAction
                | ErrorKind::TemplateRender
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnexpectedStatus { status, .. } => write!(f, "unexpected_status({status})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Outcome of a single moderation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub succeeded: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
            error_kind: None,
            error_detail: None,
        }
    }

    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> Self {
        let message = if kind.is_remote() {
            "Failed to execute command"
        } else {
            "Request was not dispatched"
        };
        Self {
            succeeded: false,
            message: message.to_string(),
            error_kind: Some(kind),
            error_detail: Some(detail.into()),
        }
    }

    pub fn from_error(err: &ModgateError) -> Self {
        Self::failure(err.error_kind(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Requestor {
        Requestor::local_admin("tester")
    }

    #[test]
    fn action_kind_parses_legacy_ipban() {
        assert_eq!("ipban".parse::<ActionKind>().unwrap(), ActionKind::Ban);
        assert_eq!("Kick".parse::<ActionKind>().unwrap(), ActionKind::Kick);
        assert!(matches!(
            "explode".parse::<ActionKind>(),
            Err(ModgateError::UnknownAction(_))
        ));
    }

    #[test]
    fn classification_matches_action_table() {
        for action in ActionKind::all() {
            let global = matches!(action, ActionKind::Freeze | ActionKind::Unfreeze);
            assert_eq!(action.is_target_scoped(), !global, "{action}");
        }
        assert!(ActionKind::Tempban.is_duration_scoped());
        assert!(!ActionKind::Ban.is_duration_scoped());
        assert!(!ActionKind::Kill.requires_reason());
        assert!(ActionKind::Warn.requires_reason());
        assert!(!ActionKind::Freeze.requires_reason());
    }

    #[test]
    fn tempban_without_duration_is_invalid() {
        let req = ActionRequest::new(ActionKind::Tempban, admin())
            .with_target("Steve")
            .with_reason("Griefing");
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("duration"));
        assert_eq!(err.error_kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn tempban_with_zero_duration_is_invalid() {
        let req = ActionRequest::new(ActionKind::Tempban, admin())
            .with_target("Steve")
            .with_reason("Griefing")
            .with_duration(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn kick_requires_non_blank_reason() {
        let req = ActionRequest::new(ActionKind::Kick, admin())
            .with_target("Steve")
            .with_reason("   ");
        assert!(req.validate().unwrap_err().to_string().contains("reason"));
    }

    #[test]
    fn kill_requires_target_but_no_reason() {
        let missing = ActionRequest::new(ActionKind::Kill, admin());
        assert!(missing.validate().is_err());
        let ok = ActionRequest::new(ActionKind::Kill, admin()).with_target("Steve");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn freeze_ignores_unused_fields() {
        let req = ActionRequest::new(ActionKind::Freeze, admin()).with_target("ignored");
        assert!(req.validate().is_ok());
        assert_eq!(req.effective_target(), None);
    }

    #[test]
    fn newline_in_reason_is_rejected() {
        let req = ActionRequest::new(ActionKind::Warn, admin())
            .with_target("Steve")
            .with_reason("spam\nop Steve");
        assert!(req
            .validate()
            .unwrap_err()
            .to_string()
            .contains("control characters"));
    }

    #[test]
    fn newline_in_optional_reason_is_rejected() {
        let kill = ActionRequest::new(ActionKind::Kill, admin())
            .with_target("Steve")
            .with_reason("x\nop Mallory");
        assert!(kill.validate().is_err());
        let freeze = ActionRequest::new(ActionKind::Freeze, admin()).with_reason("hi\rsay x");
        assert!(freeze.validate().is_err());
    }

    #[test]
    fn target_with_spaces_is_rejected() {
        let req = ActionRequest::new(ActionKind::Kill, admin()).with_target("two words");
        assert!(req.validate().is_err());
    }

    #[test]
    fn error_kind_json_is_tagged() {
        let kind = ErrorKind::UnexpectedStatus {
            status: 500,
            body: "boom".into(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "unexpected_status");
        assert_eq!(json["status"], 500);
        let timeout = serde_json::to_value(ErrorKind::Timeout).unwrap();
        assert_eq!(timeout["kind"], "timeout");
    }

    #[test]
    fn failure_message_distinguishes_local_and_remote() {
        let remote = ExecutionResult::failure(ErrorKind::AuthFailure, "bad key");
        assert_eq!(remote.message, "Failed to execute command");
        let local = ExecutionResult::failure(ErrorKind::Rejected, "no role");
        assert_eq!(local.message, "Request was not dispatched");
        assert!(!local.succeeded);
        assert_eq!(local.error_detail.as_deref(), Some("no role"));
    }

    #[test]
    fn success_result_omits_error_fields_in_json() {
        let json = serde_json::to_string(&ExecutionResult::success("ok")).unwrap();
        assert!(!json.contains("error_kind"));
        assert!(!json.contains("error_detail"));
    }
}
