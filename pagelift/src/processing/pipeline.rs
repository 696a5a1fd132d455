use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::ProcessingConfig;
use crate::error::PageliftError;
use crate::models::{
    is_output_object, PipelineStage, ProcessingOutcome, ProcessingReport, SourceDocument,
    OUTPUT_DIR_NAME,
};
use crate::ocr::OcrEngine;
use crate::raster::PageRasterizer;
use crate::storage::BlobStore;

use super::{DocumentExtraction, PageExtractor, ReportBuilder, TemporaryArtifacts};

/// Runs one storage event through download, extraction, report, upload and cleanup.
#[derive(Clone)]
pub struct ProcessingPipeline {
    store: Arc<dyn BlobStore>,
    extractor: PageExtractor,
    config: ProcessingConfig,
}

/// Local layout of one invocation.
struct ScratchLayout {
    root: PathBuf,
    output_dir: PathBuf,
    document_dir: PathBuf,
    source: PathBuf,
}

impl ScratchLayout {
    fn new(scratch_dir: &Path, document: &SourceDocument) -> Self {
        let root = scratch_dir.join(Uuid::new_v4().to_string());
        let output_dir = root.join(OUTPUT_DIR_NAME);
        let document_dir = output_dir.join(document.stem());
        let source = root.join(document.file_name());
        Self {
            root,
            output_dir,
            document_dir,
            source,
        }
    }
}

impl ProcessingPipeline {
    pub fn new(
        store: Arc<dyn BlobStore>,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrEngine>,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            store,
            extractor: PageExtractor::new(rasterizer, ocr),
            config: config.clone(),
        }
    }

    /// Never fails: every stage error ends up in the returned outcome and in the log.
    /// Cleanup runs exactly once, whatever happened before it.
    pub async fn process_document(&self, document: &SourceDocument) -> ProcessingOutcome {
        if self.config.skip_output_objects && is_output_object(&document.name) {
            info!("Skipping pipeline output object: {}", document.uri());
            return ProcessingOutcome::skipped(document);
        }

        info!("Processing new file: {}", document.uri());

        let mut outcome = ProcessingOutcome::new(document);
        let mut artifacts = TemporaryArtifacts::new();

        self.run(document, &mut artifacts, &mut outcome).await;

        let summary = artifacts.cleanup();
        outcome.artifacts_removed = summary.removed;
        outcome.cleanup_failures = summary.failures;

        match (&outcome.failed_stage, &outcome.error) {
            (Some(stage), Some(e)) => {
                error!(stage = %stage, "Error processing file: {}", e);
            }
            _ => info!(
                pages = outcome.pages_extracted,
                uploads = outcome.uploaded.len(),
                removed = outcome.artifacts_removed,
                "Processing completed successfully"
            ),
        }

        outcome
    }

    async fn run(
        &self,
        document: &SourceDocument,
        artifacts: &mut TemporaryArtifacts,
        outcome: &mut ProcessingOutcome,
    ) {
        let layout = ScratchLayout::new(&self.config.scratch_dir, document);

        for dir in [&layout.root, &layout.output_dir, &layout.document_dir] {
            if let Err(e) = artifacts.create_dir(dir) {
                outcome.record_failure(PipelineStage::Init, e);
                return;
            }
        }
        info!("Temporary directories set up: {}", layout.root.display());

        info!("Downloading {}", document.uri());
        match self
            .store
            .fetch(&document.bucket, &document.name, &layout.source)
            .await
        {
            Ok(path) => artifacts.record_file(path),
            Err(e) => {
                outcome.record_failure(PipelineStage::Downloading, e);
                return;
            }
        }

        let extraction = match self.extract(&layout).await {
            Ok(extraction) => extraction,
            Err(e) => {
                // Whatever the worker wrote before dying still has to be cleaned up.
                record_leftovers(&layout.document_dir, artifacts);
                outcome.record_failure(PipelineStage::ExtractingPages, e);
                return;
            }
        };

        for text in &extraction.texts {
            artifacts.record_file(&text.local_path);
        }
        outcome.pages_extracted = extraction.texts.len();

        if let Some((stage, e)) = extraction.error {
            outcome.record_failure(stage, &e);
            if stage == PipelineStage::Rasterizing {
                return;
            }
        }

        info!("Generating report for: {}", document.name);
        let report = ProcessingReport::new(document);
        let report_path = match ReportBuilder::write(&layout.output_dir, &report) {
            Ok(path) => {
                artifacts.record_file(&path);
                path
            }
            Err(e) => {
                outcome.record_failure(PipelineStage::Reporting, e);
                return;
            }
        };

        self.upload(document, &report_path, report.object_name(), outcome)
            .await;
        for text in &extraction.texts {
            self.upload(document, &text.local_path, &text.object_name(), outcome)
                .await;
        }
    }

    async fn extract(&self, layout: &ScratchLayout) -> crate::error::Result<DocumentExtraction> {
        let extractor = self.extractor.clone();
        let source = layout.source.clone();
        let document_dir = layout.document_dir.clone();

        tokio::task::spawn_blocking(move || extractor.extract_document(&source, &document_dir))
            .await
            .map_err(|e| PageliftError::Internal(format!("Extraction task failed: {e}")))
    }

    async fn upload(
        &self,
        document: &SourceDocument,
        source: &Path,
        object_name: &str,
        outcome: &mut ProcessingOutcome,
    ) {
        match self.store.store(&document.bucket, source, object_name).await {
            Ok(()) => outcome.uploaded.push(object_name.to_string()),
            Err(e) => {
                warn!("Error uploading {} to {}: {}", source.display(), object_name, e);
                outcome.failed_uploads.push(object_name.to_string());
                outcome.record_failure(PipelineStage::Uploading, e);
            }
        }
    }
}

fn record_leftovers(document_dir: &Path, artifacts: &mut TemporaryArtifacts) {
    let Ok(entries) = fs::read_dir(document_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            artifacts.record_file(path);
        }
    }
}
