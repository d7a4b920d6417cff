use thiserror::Error;

use crate::context::ContextError;

/// Catalog-wide error types for pcbook.
///
/// Stores report absence as `Ok(None)`, never as an error. The RPC layer maps
/// every variant onto a gRPC status code at the service boundary.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A record with the same key is already stored.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// Caller-supplied data is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage layer error (lock poisoning, disk writes).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Token is malformed, tampered with, or expired.
    #[error("Token error: {0}")]
    Token(String),

    /// Cryptographic error (key derivation, signing, password hashing).
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Outbound delivery to a caller failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The call was cancelled or ran past its deadline.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for CatalogError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        CatalogError::Crypto(e.to_string())
    }
}

impl From<hex::FromHexError> for CatalogError {
    fn from(e: hex::FromHexError) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

impl From<prost::EncodeError> for CatalogError {
    fn from(e: prost::EncodeError) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

impl From<prost::DecodeError> for CatalogError {
    fn from(e: prost::DecodeError) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Storage(e.to_string())
    }
}
