//! Object storage access.
//!
//! The pipeline only needs two operations: download one object to a local
//! path, and upload one local file under an object name. [`GcsBlobStore`]
//! speaks the Cloud Storage JSON API.

mod gcs;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

pub use gcs::GcsBlobStore;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Downloads `object_name` from `bucket` into `destination`.
    ///
    /// Returns [`crate::error::PageliftError::NotFound`] when the object does
    /// not exist. No partial file is left behind on failure.
    async fn fetch(&self, bucket: &str, object_name: &str, destination: &Path) -> Result<PathBuf>;

    /// Uploads `source` as `object_name`, overwriting any existing object.
    async fn store(&self, bucket: &str, source: &Path, object_name: &str) -> Result<()>;
}
