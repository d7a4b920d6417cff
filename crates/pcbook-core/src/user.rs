// crates/pcbook-core/src/user.rs
//
// Credential records for login.

use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::error::CatalogError;

/// A user allowed to log in.
///
/// The password is never stored in clear; see `crypto::hash_password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub hashed_password: String,
    pub role: String,
}

impl User {
    /// Create a user, salting and hashing the clear-text password.
    pub fn new(username: &str, password: &str, role: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            username: username.to_string(),
            hashed_password: crypto::hash_password(password)?,
            role: role.to_string(),
        })
    }

    pub fn is_correct_password(&self, password: &str) -> bool {
        crypto::verify_password(&self.hashed_password, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_hides_password() {
        let user = User::new("admin1", "secret", "admin").unwrap();
        assert_ne!(user.hashed_password, "secret");
        assert!(!user.hashed_password.contains("secret"));
        assert!(user.is_correct_password("secret"));
        assert!(!user.is_correct_password("wrong"));
    }
}
