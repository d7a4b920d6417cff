// crates/pcbook-core/src/lib.rs
//
// pcbook-core: Core types, traits, and credential primitives for the pcbook
// laptop catalog.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the catalog messages shared by the stores and the RPC layer,
// the error type, the call context used for cooperative cancellation,
// the token manager, user records, and the store trait interfaces.

pub mod access;
pub mod context;
pub mod crypto;
pub mod error;
pub mod filter;
pub mod laptop;
pub mod sample;
pub mod serializer;
pub mod token;
pub mod traits;
pub mod user;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use pcbook_core::Laptop;`

// Catalog messages
pub use filter::Filter;
pub use laptop::{Cpu, Gpu, Keyboard, Laptop, Memory, Rating, Screen, Storage};

// Call context
pub use context::{CallContext, ContextError};

// Auth
pub use access::AccessPolicy;
pub use token::{TokenManager, UserClaims};
pub use user::User;

// Error type
pub use error::CatalogError;

// Traits
pub use traits::{ImageStore, LaptopSink, LaptopStore, RatingStore, UserStore};
