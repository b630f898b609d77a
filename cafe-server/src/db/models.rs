//! Persisted records that never leave the server as-is

use serde::{Deserialize, Serialize};
use shared::models::{StaffInfo, StaffRole};

/// Staff account row (员工)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffAccount {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    /// argon2 PHC string
    pub password_hash: String,
    pub role: StaffRole,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub created_at: i64,
}

impl StaffAccount {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    pub fn to_info(&self) -> StaffInfo {
        StaffInfo {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            is_active: self.is_active,
        }
    }
}

/// Server-side session created at login
///
/// Only the SHA-256 of the refresh token is kept; the plaintext exists on the
/// client alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub staff_id: i64,
    pub refresh_hash: String,
    pub issued_at: i64,
    pub refresh_expires_at: i64,
    /// Expiry of the most recently minted access token
    pub access_expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<i64>,
}

impl SessionRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.refresh_expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = StaffAccount::hash_password("correct horse").unwrap();
        let account = StaffAccount {
            id: 1,
            username: "ana".to_string(),
            display_name: "Ana".to_string(),
            password_hash: hash,
            role: StaffRole::Chef,
            is_active: true,
            email: None,
            email_verified: false,
            created_at: 0,
        };
        assert!(account.verify_password("correct horse").unwrap());
        assert!(!account.verify_password("wrong").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let account = StaffAccount {
            id: 1,
            username: "ana".to_string(),
            display_name: "Ana".to_string(),
            password_hash: "not-a-phc-string".to_string(),
            role: StaffRole::Staff,
            is_active: true,
            email: None,
            email_verified: false,
            created_at: 0,
        };
        assert!(account.verify_password("x").is_err());
    }
}
