use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::{REPORT_OBJECT_NAME, TEXT_OUTPUT_PREFIX};
use crate::error::{PageliftError, Result};

/// A newly created object, identified by its bucket and full object name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub bucket: String,
    pub name: String,
}

impl SourceDocument {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let doc = Self {
            bucket: bucket.into(),
            name: name.into(),
        };

        if doc.bucket.trim().is_empty() {
            return Err(PageliftError::InvalidEvent("bucket is empty".to_string()));
        }
        match doc.name.rsplit('/').next() {
            Some(file) if !file.is_empty() && file != "." && file != ".." => Ok(doc),
            _ => Err(PageliftError::InvalidEvent(format!(
                "object name '{}' has no file component",
                doc.name
            ))),
        }
    }

    /// Last path component of the object name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// File name without its final extension (`invoice.pdf` -> `invoice`).
    pub fn stem(&self) -> &str {
        Path::new(self.file_name())
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_else(|| self.file_name())
    }

    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }
}

/// One rendered page. Ordinals start at 1 and follow physical page order.
pub struct RasterPage {
    pub ordinal: u32,
    pub image: DynamicImage,
}

impl std::fmt::Debug for RasterPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterPage")
            .field("ordinal", &self.ordinal)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// OCR output for a single page, already written to `local_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub page: u32,
    pub text: String,
    pub local_path: PathBuf,
}

impl ExtractedText {
    /// Object name derived from the parent directory and file name of the local file.
    pub fn object_name(&self) -> String {
        let file = self
            .local_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = self
            .local_path
            .parent()
            .and_then(|p| p.file_name())
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{TEXT_OUTPUT_PREFIX}/{dir}/{file}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingReport {
    pub document_name: String,
    pub bucket: String,
    pub generated_at: DateTime<Utc>,
}

impl ProcessingReport {
    pub fn new(document: &SourceDocument) -> Self {
        Self {
            document_name: document.name.clone(),
            bucket: document.bucket.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Processing Report\n{}\nFile Name: {}\nBucket: {}\nProcessing Time: {}\n",
            "=".repeat(40),
            self.document_name,
            self.bucket,
            self.generated_at.to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }

    pub fn object_name(&self) -> &'static str {
        REPORT_OBJECT_NAME
    }
}
