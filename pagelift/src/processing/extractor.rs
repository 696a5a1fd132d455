use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{PageliftError, Result};
use crate::models::{ExtractedText, PipelineStage, RasterPage};
use crate::ocr::{OcrEngine, OrientationCorrector};
use crate::raster::{PageRasterizer, PageVisitor};

/// Runs OCR over one page and writes the text next to its siblings.
#[derive(Clone)]
pub struct TextExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    /// Writes `{document_dir}/page_{n}.txt`. Engine failures propagate.
    pub fn extract(&self, page: &RasterPage, document_dir: &Path) -> Result<ExtractedText> {
        let text = self.engine.recognize(&page.image)?;
        let local_path = document_dir.join(format!("page_{}.txt", page.ordinal));

        if let Err(e) = fs::write(&local_path, text.as_bytes()) {
            // A partial file must not outlive the invocation unrecorded.
            let _ = fs::remove_file(&local_path);
            return Err(PageliftError::Io(e));
        }

        Ok(ExtractedText {
            page: page.ordinal,
            text,
            local_path,
        })
    }
}

/// Result of rasterizing and extracting one document.
///
/// `texts` holds every page completed before `error`, if any.
#[derive(Debug, Default)]
pub struct DocumentExtraction {
    pub page_count: Option<u32>,
    pub texts: Vec<ExtractedText>,
    pub error: Option<(PipelineStage, PageliftError)>,
}

impl DocumentExtraction {
    pub fn opened(&self) -> bool {
        self.page_count.is_some()
    }
}

/// Sequences orientation correction and text extraction over every page.
#[derive(Clone)]
pub struct PageExtractor {
    rasterizer: Arc<dyn PageRasterizer>,
    corrector: OrientationCorrector,
    text: TextExtractor,
}

struct ExtractionVisitor<'a> {
    corrector: &'a OrientationCorrector,
    text: &'a TextExtractor,
    document_dir: &'a Path,
    label: &'a str,
    result: DocumentExtraction,
}

impl PageVisitor for ExtractionVisitor<'_> {
    fn opened(&mut self, page_count: u32) {
        info!(pages = page_count, "Opened {} ({} pages)", self.label, page_count);
        self.result.page_count = Some(page_count);
    }

    fn page(&mut self, page: RasterPage) -> Result<()> {
        info!(page = page.ordinal, "Processing page {} of {}", page.ordinal, self.label);
        let page = self.corrector.correct(page);
        let extracted = self.text.extract(&page, self.document_dir)?;
        info!(
            page = extracted.page,
            "Processed page {}, saved to {}",
            extracted.page,
            extracted.local_path.display()
        );
        self.result.texts.push(extracted);
        Ok(())
    }
}

impl PageExtractor {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            rasterizer,
            corrector: OrientationCorrector::new(engine.clone()),
            text: TextExtractor::new(engine),
        }
    }

    /// Blocking. Never fails as a whole: a fatal error ends the page loop and is
    /// returned alongside the pages finished before it.
    pub fn extract_document(&self, source: &Path, document_dir: &Path) -> DocumentExtraction {
        let label = document_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut visitor = ExtractionVisitor {
            corrector: &self.corrector,
            text: &self.text,
            document_dir,
            label: &label,
            result: DocumentExtraction::default(),
        };

        let outcome = self.rasterizer.rasterize(source, &mut visitor);
        let mut result = visitor.result;

        if let Err(e) = outcome {
            let stage = if result.opened() {
                PipelineStage::ExtractingPages
            } else {
                PipelineStage::Rasterizing
            };
            warn!(
                %stage,
                pages_completed = result.texts.len(),
                "Stopped processing {}: {}", label, e
            );
            result.error = Some((stage, e));
        }

        result
    }
}
