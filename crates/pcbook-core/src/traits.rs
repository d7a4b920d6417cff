// crates/pcbook-core/src/traits.rs

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::laptop::{Laptop, Rating};
use crate::user::User;

/// Receiver for laptops found by `LaptopStore::search`.
///
/// Returning an error stops the scan; the store surfaces that error.
#[async_trait]
pub trait LaptopSink: Send {
    async fn found(&mut self, laptop: Laptop) -> Result<(), CatalogError>;
}

/// Collecting into a Vec never fails.
#[async_trait]
impl LaptopSink for Vec<Laptop> {
    async fn found(&mut self, laptop: Laptop) -> Result<(), CatalogError> {
        self.push(laptop);
        Ok(())
    }
}

/// Trait for laptop catalog storage.
///
/// Implemented by pcbook-store (in-memory backend).
#[async_trait]
pub trait LaptopStore: Send + Sync {
    /// Save a copy of the laptop. Fails with `AlreadyExists` if the id is taken.
    async fn save(&self, laptop: &Laptop) -> Result<String, CatalogError>;

    /// Retrieve a copy of a laptop by id. Absence is `Ok(None)`.
    async fn find(&self, id: &str) -> Result<Option<Laptop>, CatalogError>;

    /// Hand every laptop matching `filter` to `sink`, checking `ctx` before
    /// each candidate.
    async fn search(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        sink: &mut dyn LaptopSink,
    ) -> Result<(), CatalogError>;
}

/// Trait for laptop image storage.
///
/// Implemented by pcbook-store (disk backend).
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image for `laptop_id` and return its generated id.
    async fn save(
        &self,
        laptop_id: &str,
        image_type: &str,
        data: Vec<u8>,
    ) -> Result<String, CatalogError>;
}

/// Image types become part of a file name, so they may not contain path
/// separators or parent references.
pub fn check_image_type(image_type: &str) -> Result<(), CatalogError> {
    if image_type.contains(['/', '\\']) || image_type.contains("..") {
        return Err(CatalogError::InvalidArgument(format!(
            "invalid image type '{}'",
            image_type
        )));
    }
    Ok(())
}

/// Trait for laptop rating aggregates.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Atomically add one score and return the updated aggregate.
    async fn add(&self, laptop_id: &str, score: f64) -> Result<Rating, CatalogError>;
}

/// Trait for credential storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Save a user. Fails with `AlreadyExists` if the username is taken.
    async fn save(&self, user: &User) -> Result<(), CatalogError>;

    /// Retrieve a user by username. Absence is `Ok(None)`.
    async fn find(&self, username: &str) -> Result<Option<User>, CatalogError>;
}
