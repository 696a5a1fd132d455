use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, RequestBuilder, StatusCode,
};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use super::BlobStore;
use crate::config::{StorageAuth, StorageConfig};
use crate::error::{PageliftError, Result};

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Cloud Storage client over the JSON API.
#[derive(Clone)]
pub struct GcsBlobStore {
    client: Client,
    base_url: Url,
    auth: StorageAuth,
}

impl GcsBlobStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PageliftError::Internal(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(PageliftError::Internal(format!(
                "Storage base URL '{}' cannot be a base",
                config.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            auth: config.auth.clone(),
        })
    }

    fn download_url(&self, bucket: &str, object_name: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            // cannot_be_a_base was rejected in new()
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(["storage", "v1", "b", bucket, "o", object_name]);
            }
        }
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }

    fn upload_url(&self, bucket: &str, object_name: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(["upload", "storage", "v1", "b", bucket, "o"]);
            }
        }
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object_name);
        url
    }

    async fn bearer_token(&self) -> Result<Option<String>> {
        match &self.auth {
            StorageAuth::Anonymous => Ok(None),
            StorageAuth::Static(token) => Ok(Some(token.clone())),
            StorageAuth::Metadata { host } => self.metadata_token(host).await.map(Some),
        }
    }

    async fn metadata_token(&self, host: &str) -> Result<String> {
        let url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}/computeMetadata/v1/instance/service-accounts/default/token")
        } else {
            format!("http://{host}/computeMetadata/v1/instance/service-accounts/default/token")
        };

        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| PageliftError::StorageAuth(format!("Metadata server unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(PageliftError::StorageAuth(format!(
                "Metadata server returned {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| PageliftError::StorageAuth(format!("Malformed token response: {e}")))?;
        debug!("Obtained storage access token from metadata server");

        Ok(token.access_token)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self.bearer_token().await? {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| PageliftError::StorageAuth(format!("Invalid token header: {e}")))?;
                Ok(request.header(AUTHORIZATION, value))
            }
            None => Ok(request),
        }
    }

    async fn download_to(&self, bucket: &str, object_name: &str, destination: &Path) -> Result<()> {
        let uri = format!("gs://{bucket}/{object_name}");
        let request = self
            .authorize(self.client.get(self.download_url(bucket, object_name)))
            .await?;

        let mut response = request
            .send()
            .await
            .map_err(|e| PageliftError::Fetch(format!("{uri}: {e}")))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(PageliftError::NotFound(uri)),
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(PageliftError::Fetch(format!("{uri}: {status} {body}")));
            }
        }

        let mut file = tokio::fs::File::create(destination).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PageliftError::Fetch(format!("{uri}: {e}")))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn fetch(&self, bucket: &str, object_name: &str, destination: &Path) -> Result<PathBuf> {
        if let Err(e) = self.download_to(bucket, object_name, destination).await {
            let _ = tokio::fs::remove_file(destination).await;
            return Err(e);
        }

        info!("Downloaded gs://{}/{} to {}", bucket, object_name, destination.display());
        Ok(destination.to_path_buf())
    }

    async fn store(&self, bucket: &str, source: &Path, object_name: &str) -> Result<()> {
        let body = tokio::fs::read(source).await.map_err(|e| {
            PageliftError::Upload(format!("Cannot read {}: {e}", source.display()))
        })?;
        let content_type = mime_guess::from_path(source).first_or_octet_stream();

        let request = self
            .authorize(
                self.client
                    .post(self.upload_url(bucket, object_name))
                    .header(CONTENT_TYPE, content_type.as_ref())
                    .body(body),
            )
            .await?;

        let response = request
            .send()
            .await
            .map_err(|e| PageliftError::Upload(format!("gs://{bucket}/{object_name}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PageliftError::Upload(format!(
                "gs://{bucket}/{object_name}: {status} {body}"
            )));
        }

        info!("Uploaded {} to gs://{}/{}", source.display(), bucket, object_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base_url: &str) -> GcsBlobStore {
        GcsBlobStore::new(&StorageConfig {
            base_url: base_url.to_string(),
            auth: StorageAuth::Anonymous,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_download_url_escapes_object_name() {
        let gcs = store("https://storage.googleapis.com");
        let url = gcs.download_url("incoming", "scans/march invoice.pdf");
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/incoming/o/scans%2Fmarch%20invoice.pdf?alt=media"
        );
    }

    #[test]
    fn test_upload_url_carries_name_as_query() {
        let gcs = store("http://localhost:4443/");
        let url = gcs.upload_url("incoming", "text_outputs/invoice/page_1.txt");
        assert_eq!(url.path(), "/upload/storage/v1/b/incoming/o");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("uploadType".to_string(), "media".to_string()),
                ("name".to_string(), "text_outputs/invoice/page_1.txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = GcsBlobStore::new(&StorageConfig {
            base_url: "mailto:ops@example.com".to_string(),
            auth: StorageAuth::Anonymous,
            timeout_secs: 5,
        });
        assert!(result.is_err());
    }
}
