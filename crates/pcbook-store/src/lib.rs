// crates/pcbook-store/src/lib.rs
//
// pcbook-store: Storage layer for the pcbook laptop catalog.
//
// Provides an in-memory laptop catalog with cancellable filtered scans,
// a disk-backed image store, an in-memory rating aggregate and an in-memory
// credential store. Each store owns its lock and implements the matching
// trait from `pcbook_core::traits`.

pub mod image;
pub mod memory;
pub mod rating;
pub mod user;

// Re-export key types for ergonomic access from downstream crates.
pub use image::{DiskImageStore, ImageInfo};
pub use memory::InMemoryLaptopStore;
pub use rating::InMemoryRatingStore;
pub use user::InMemoryUserStore;
