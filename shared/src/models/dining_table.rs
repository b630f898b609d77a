//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (桌台), addressed by the number printed on its QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiningTable {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Table verification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableVerification {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub is_active: bool,
}

impl From<&DiningTable> for TableVerification {
    fn from(table: &DiningTable) -> Self {
        Self {
            number: table.number,
            label: table.label.clone(),
            is_active: table.is_active,
        }
    }
}
