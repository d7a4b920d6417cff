// crates/pcbook-store/src/user.rs
//
// In-memory credential store implementing the `UserStore` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pcbook_core::error::CatalogError;
use pcbook_core::traits::UserStore;
use pcbook_core::user::User;

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save(&self, user: &User) -> Result<(), CatalogError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;

        if users.contains_key(&user.username) {
            return Err(CatalogError::AlreadyExists(format!(
                "user {}",
                user.username
            )));
        }

        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find(&self, username: &str) -> Result<Option<User>, CatalogError> {
        let users = self
            .users
            .read()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(users.get(username).cloned())
    }
}
