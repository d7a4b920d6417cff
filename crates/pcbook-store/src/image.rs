// crates/pcbook-store/src/image.rs
//
// Disk-backed image store implementing the `ImageStore` trait.
//
// Each image is written to `<image_dir>/<image_id><image_type>` and indexed
// in memory by its id. The index is not rebuilt on restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use pcbook_core::error::CatalogError;
use pcbook_core::traits::{check_image_type, ImageStore};

/// Metadata recorded for every saved image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub laptop_id: String,
    pub image_type: String,
    pub path: PathBuf,
}

/// Stores laptop images as files in a single directory.
#[derive(Debug)]
pub struct DiskImageStore {
    image_dir: PathBuf,
    images: RwLock<HashMap<String, ImageInfo>>,
}

impl DiskImageStore {
    /// Open an image store rooted at `image_dir`, creating the directory if
    /// it does not exist.
    pub async fn new(image_dir: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let image_dir = image_dir.into();
        fs::create_dir_all(&image_dir).await.map_err(|e| {
            CatalogError::Storage(format!(
                "cannot create image directory '{}': {}",
                image_dir.display(),
                e
            ))
        })?;

        info!(path = %image_dir.display(), "Image store initialized");

        Ok(Self {
            image_dir,
            images: RwLock::new(HashMap::new()),
        })
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Look up the metadata of a saved image.
    pub fn get(&self, image_id: &str) -> Result<Option<ImageInfo>, CatalogError> {
        let images = self
            .images
            .read()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(images.get(image_id).cloned())
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn save(
        &self,
        laptop_id: &str,
        image_type: &str,
        data: Vec<u8>,
    ) -> Result<String, CatalogError> {
        check_image_type(image_type)?;

        let image_id = Uuid::new_v4().to_string();
        let path = self.image_dir.join(format!("{}{}", image_id, image_type));

        fs::write(&path, &data).await.map_err(|e| {
            CatalogError::Storage(format!("cannot write image file {}: {}", path.display(), e))
        })?;

        let mut images = self
            .images
            .write()
            .map_err(|e| CatalogError::Storage(format!("RwLock poisoned: {}", e)))?;
        images.insert(
            image_id.clone(),
            ImageInfo {
                laptop_id: laptop_id.to_string(),
                image_type: image_type.to_string(),
                path,
            },
        );

        debug!(image_id = %image_id, laptop_id, size = data.len(), "Saved image");
        Ok(image_id)
    }
}
