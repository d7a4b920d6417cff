// crates/pcbook-store/src/rating.rs
//
// In-memory rating aggregates implementing the `RatingStore` trait.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use pcbook_core::error::CatalogError;
use pcbook_core::laptop::Rating;
use pcbook_core::traits::RatingStore;

/// Running count and sum of scores per laptop id.
///
/// Every update happens under one mutex, so concurrent adds never lose an
/// increment.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    ratings: Mutex<HashMap<String, Rating>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current aggregate for a laptop, if it was ever rated.
    pub fn get(&self, laptop_id: &str) -> Result<Option<Rating>, CatalogError> {
        let ratings = self
            .ratings
            .lock()
            .map_err(|e| CatalogError::Storage(format!("Mutex poisoned: {}", e)))?;
        Ok(ratings.get(laptop_id).copied())
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn add(&self, laptop_id: &str, score: f64) -> Result<Rating, CatalogError> {
        let mut ratings = self
            .ratings
            .lock()
            .map_err(|e| CatalogError::Storage(format!("Mutex poisoned: {}", e)))?;

        let rating = ratings.entry(laptop_id.to_string()).or_default();
        rating.count += 1;
        rating.sum += score;
        Ok(*rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sequential_adds() {
        let store = InMemoryRatingStore::new();
        assert!(store.get("a").unwrap().is_none());

        let scores = [8.0, 5.0, 10.0, 1.0];
        let mut last = Rating::default();
        for (i, score) in scores.iter().enumerate() {
            last = store.add("a", *score).await.unwrap();
            assert_eq!(last.count, i as u32 + 1);
        }

        assert_eq!(last.sum, 24.0);
        assert!((last.average() - 6.0).abs() < 1e-9);
        assert_eq!(store.get("a").unwrap(), Some(last));
    }

    #[tokio::test]
    async fn test_laptops_rated_independently() {
        let store = InMemoryRatingStore::new();
        store.add("a", 3.0).await.unwrap();
        let b = store.add("b", 7.0).await.unwrap();
        assert_eq!(b.count, 1);
        assert_eq!(b.sum, 7.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_not_lost() {
        let store = Arc::new(InMemoryRatingStore::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    store.add("hot", 2.0).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let rating = store.get("hot").unwrap().unwrap();
        assert_eq!(rating.count, 400);
        assert_eq!(rating.sum, 800.0);
    }
}
