// crates/pcbook-store/src/memory.rs
//
// In-memory laptop catalog implementing the `LaptopStore` trait.
//
// Laptops live in a BTreeMap keyed by id behind a single RwLock, so scans
// see them in ascending id order. A search copies the candidates out under
// the read lock and releases it before handing anything to the sink; a slow
// consumer therefore never blocks writers.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pcbook_core::context::CallContext;
use pcbook_core::error::CatalogError;
use pcbook_core::filter::Filter;
use pcbook_core::laptop::Laptop;
use pcbook_core::traits::{LaptopSink, LaptopStore};

/// In-memory laptop catalog.
#[derive(Debug, Default)]
pub struct InMemoryLaptopStore {
    /// Map from laptop id to the stored copy.
    laptops: RwLock<BTreeMap<String, Laptop>>,
}

impl InMemoryLaptopStore {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored laptops.
    pub fn len(&self) -> Result<usize, CatalogError> {
        let laptops = self
            .laptops
            .read()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(laptops.len())
    }

    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.len()? == 0)
    }

    fn snapshot(&self) -> Result<Vec<Laptop>, CatalogError> {
        let laptops = self
            .laptops
            .read()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(laptops.values().cloned().collect())
    }
}

#[async_trait]
impl LaptopStore for InMemoryLaptopStore {
    async fn save(&self, laptop: &Laptop) -> Result<String, CatalogError> {
        let mut laptops = self
            .laptops
            .write()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;

        if laptops.contains_key(&laptop.id) {
            return Err(CatalogError::AlreadyExists(format!(
                "laptop with ID {}",
                laptop.id
            )));
        }

        laptops.insert(laptop.id.clone(), laptop.clone());
        Ok(laptop.id.clone())
    }

    async fn find(&self, id: &str) -> Result<Option<Laptop>, CatalogError> {
        let laptops = self
            .laptops
            .read()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(laptops.get(id).cloned())
    }

    async fn search(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        sink: &mut dyn LaptopSink,
    ) -> Result<(), CatalogError> {
        // The read guard is dropped inside `snapshot`.
        let candidates = self.snapshot()?;

        for laptop in candidates {
            ctx.check()?;
            if filter.matches(&laptop) {
                sink.found(laptop).await?;
            }
        }

        Ok(())
    }
}
