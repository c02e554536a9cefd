use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User role. Persisted and compared in its uppercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Worker,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Worker, Role::Manager, Role::Admin];
    pub const STAFF: [Role; 2] = [Role::Manager, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Worker => "WORKER",
        }
    }

    /// Uppercase a free-form role label without validating it.
    pub fn normalize(label: &str) -> String {
        label.trim().to_uppercase()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Role::normalize(s).as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "WORKER" => Ok(Role::Worker),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
