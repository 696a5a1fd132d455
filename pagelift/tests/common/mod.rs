#![allow(dead_code)]

mod memory;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use image::DynamicImage;

use pagelift::config::ProcessingConfig;
use pagelift::error::{PageliftError, Result};
use pagelift::models::RasterPage;
use pagelift::ocr::OcrEngine;
use pagelift::processing::ProcessingPipeline;
use pagelift::raster::{PageRasterizer, PageVisitor};

pub use memory::MemoryBlobStore;

/// How a page fails after the document opened.
#[derive(Clone, Copy)]
pub enum PageFailure {
    /// The renderer returns an error for the page.
    Render,
    /// The rendering thread panics.
    Panic,
}

/// Stands in for PDFium: every "document" has a fixed number of blank pages,
/// page `n` being `10 * n` pixels wide so recognized text differs per page.
pub struct FakeRasterizer {
    pub pages: u32,
    pub unreadable: bool,
    pub failure: Option<(u32, PageFailure)>,
}

impl FakeRasterizer {
    pub fn with_pages(pages: u32) -> Self {
        Self {
            pages,
            unreadable: false,
            failure: None,
        }
    }

    pub fn unreadable() -> Self {
        Self {
            pages: 0,
            unreadable: true,
            failure: None,
        }
    }

    /// Opens fine, then fails on page `page`.
    pub fn failing_on(pages: u32, page: u32, failure: PageFailure) -> Self {
        Self {
            pages,
            unreadable: false,
            failure: Some((page, failure)),
        }
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, path: &Path, visitor: &mut dyn PageVisitor) -> Result<()> {
        if self.unreadable || !path.exists() {
            return Err(PageliftError::DocumentOpen(format!(
                "cannot open {}",
                path.display()
            )));
        }

        visitor.opened(self.pages);
        for ordinal in 1..=self.pages {
            match self.failure {
                Some((page, PageFailure::Render)) if page == ordinal => {
                    return Err(PageliftError::Render(format!("page {ordinal}: bitmap failed")));
                }
                Some((page, PageFailure::Panic)) if page == ordinal => {
                    panic!("renderer crashed on page {ordinal}");
                }
                _ => {}
            }
            visitor.page(RasterPage {
                ordinal,
                image: DynamicImage::new_rgb8(10 * ordinal, 20),
            })?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub enum Osd {
    /// Detection always fails, as on pages without usable text layout.
    Fails,
    Rotate(i32),
}

/// Deterministic engine: text depends only on the image dimensions.
pub struct FakeOcr {
    osd: Osd,
    fail_on_page: Option<u32>,
    calls: AtomicU32,
}

impl FakeOcr {
    pub fn new(osd: Osd) -> Self {
        Self {
            osd,
            fail_on_page: None,
            calls: AtomicU32::new(0),
        }
    }

    /// The engine crashes when asked to recognize the `page`-th image.
    pub fn crashing_on(page: u32) -> Self {
        Self {
            osd: Osd::Rotate(0),
            fail_on_page: Some(page),
            calls: AtomicU32::new(0),
        }
    }
}

impl OcrEngine for FakeOcr {
    fn detect_rotation(&self, _image: &DynamicImage) -> Result<i32> {
        match self.osd {
            Osd::Fails => Err(PageliftError::OrientationDetection(
                "Too few characters. Skipping this page".to_string(),
            )),
            Osd::Rotate(degrees) => Ok(degrees),
        }
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_page == Some(call) {
            return Err(PageliftError::Ocr("tesseract exited unexpectedly".to_string()));
        }
        Ok(format!("{}x{}\n", image.width(), image.height()))
    }
}

pub fn pipeline(
    store: Arc<MemoryBlobStore>,
    scratch: &Path,
    rasterizer: FakeRasterizer,
    ocr: FakeOcr,
) -> ProcessingPipeline {
    let config = ProcessingConfig {
        scratch_dir: scratch.to_path_buf(),
        ..ProcessingConfig::default()
    };
    ProcessingPipeline::new(store, Arc::new(rasterizer), Arc::new(ocr), &config)
}

pub fn store_with(bucket: &str, name: &str) -> Arc<MemoryBlobStore> {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert(bucket, name, b"%PDF-1.7 fake".to_vec());
    store
}

pub fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).map(|mut d| d.next().is_none()).unwrap_or(false)
}
