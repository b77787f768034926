use serde::{Deserialize, Serialize};

use crate::types::Requestor;

/// Who may issue moderation actions.
///
/// With an `admin_role` configured, holding that role is required and
/// sufficient. Without one, the requestor must be an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_role: Option<String>,
}

impl AccessPolicy {
    pub fn new(admin_role: Option<String>) -> Self {
        Self { admin_role }
    }

    /// Returns the refusal reason when the requestor lacks the capability.
    pub fn authorize(&self, requestor: &Requestor) -> Result<(), String> {
        match self.admin_role.as_deref() {
            Some(role) if requestor.has_role(role) => Ok(()),
            Some(role) => Err(format!(
                "{} does not hold the '{role}' role required for admin actions",
                requestor.name
            )),
            None if requestor.administrator => Ok(()),
            None => Err(format!(
                "{} needs administrator permissions to issue admin actions",
                requestor.name
            )),
        }
    }
}
