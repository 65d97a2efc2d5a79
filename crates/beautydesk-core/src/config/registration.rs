//! Role assignment for newly registered identities.

use serde::{Deserialize, Serialize};

/// Registration policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Role given to self-service registrations (`admin`, `manager`, `employee`).
    #[serde(default = "default_role")]
    pub default_role: String,
    /// Whether the first identity of an empty store becomes an admin.
    #[serde(default = "default_true")]
    pub bootstrap_admin: bool,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            bootstrap_admin: true,
        }
    }
}

fn default_role() -> String {
    "employee".to_string()
}

fn default_true() -> bool {
    true
}
