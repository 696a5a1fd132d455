use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use pagelift::error::{PageliftError, Result};
use pagelift::storage::BlobStore;

/// In-process object store keyed by `(bucket, object_name)`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    failing_uploads: Mutex<HashSet<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, object_name: &str, bytes: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), object_name.to_string()), bytes.into());
    }

    pub fn get(&self, bucket: &str, object_name: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), object_name.to_string()))
            .cloned()
    }

    /// Object names in `bucket`, sorted.
    pub fn object_names(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Makes every later upload to `object_name` fail.
    pub fn fail_uploads_to(&self, object_name: &str) {
        self.failing_uploads
            .lock()
            .unwrap()
            .insert(object_name.to_string());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn fetch(&self, bucket: &str, object_name: &str, destination: &Path) -> Result<PathBuf> {
        let bytes = self
            .get(bucket, object_name)
            .ok_or_else(|| PageliftError::NotFound(format!("gs://{bucket}/{object_name}")))?;

        tokio::fs::write(destination, bytes).await?;
        Ok(destination.to_path_buf())
    }

    async fn store(&self, bucket: &str, source: &Path, object_name: &str) -> Result<()> {
        if self.failing_uploads.lock().unwrap().contains(object_name) {
            return Err(PageliftError::Upload(format!(
                "gs://{bucket}/{object_name}: permission denied"
            )));
        }

        let bytes = tokio::fs::read(source)
            .await
            .map_err(|e| PageliftError::Upload(format!("Cannot read {}: {e}", source.display())))?;
        self.insert(bucket, object_name, bytes);
        Ok(())
    }
}
