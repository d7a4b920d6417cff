// crates/pcbook-core/src/serializer.rs
//
// File and JSON helpers for prost messages. Used by tests to compare
// laptops structurally and by the CLI to print them.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::CatalogError;

/// Encode a message in protobuf binary format and write it to `path`.
pub fn write_protobuf_to_binary_file<M: prost::Message>(
    message: &M,
    path: &Path,
) -> Result<(), CatalogError> {
    let data = message.encode_to_vec();
    fs::write(path, data).map_err(|e| {
        CatalogError::Storage(format!("cannot write binary data to {}: {}", path.display(), e))
    })
}

/// Read a protobuf binary file written by `write_protobuf_to_binary_file`.
pub fn read_protobuf_from_binary_file<M: prost::Message + Default>(
    path: &Path,
) -> Result<M, CatalogError> {
    let data = fs::read(path).map_err(|e| {
        CatalogError::Storage(format!("cannot read binary data from {}: {}", path.display(), e))
    })?;
    Ok(M::decode(data.as_slice())?)
}

/// Render a message as pretty JSON.
pub fn to_json<T: Serialize>(message: &T) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(message)?)
}

/// Write a message as pretty JSON to `path`.
pub fn write_json_file<T: Serialize>(message: &T, path: &Path) -> Result<(), CatalogError> {
    let json = to_json(message)?;
    fs::write(path, json).map_err(|e| {
        CatalogError::Storage(format!("cannot write JSON data to {}: {}", path.display(), e))
    })
}
