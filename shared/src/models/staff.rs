//! Staff Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Staff role, ordered by privilege: `Staff < Chef < Admin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Staff,
    Chef,
    Admin,
}

impl StaffRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Staff => "staff",
            StaffRole::Chef => "chef",
            StaffRole::Admin => "admin",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff response (without password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffInfo {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: StaffRole,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(StaffRole::Admin > StaffRole::Chef);
        assert!(StaffRole::Chef > StaffRole::Staff);
        assert_eq!(
            serde_json::to_string(&StaffRole::Chef).unwrap(),
            "\"chef\""
        );
    }
}
