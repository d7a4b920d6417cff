// crates/pcbook-daemon/src/seed.rs
//
// Startup seeding of the credential store.

use pcbook_core::error::CatalogError;
use pcbook_core::traits::UserStore;
use pcbook_core::user::User;

use crate::config::UserConfig;

/// Hash and store every configured user. Fails on the first duplicate.
pub async fn seed_users(store: &dyn UserStore, users: &[UserConfig]) -> Result<usize, CatalogError> {
    for user in users {
        store
            .save(&User::new(&user.username, &user.password, &user.role)?)
            .await?;
        tracing::info!("Seeded user {} with role {}", user.username, user.role);
    }
    Ok(users.len())
}
