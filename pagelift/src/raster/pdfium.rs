use std::path::Path;
use std::sync::Mutex;

use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;
use tracing::debug;

use super::{PageRasterizer, PageVisitor};
use crate::config::ProcessingConfig;
use crate::error::{PageliftError, Result};
use crate::models::RasterPage;

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// PDFium keeps process-wide state and dropping a `Pdfium` destroys it. Held
/// from bind until the binding is dropped, so no document is ever rendered
/// while another invocation tears the library down.
static LIBRARY_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` while holding [`LIBRARY_LOCK`].
fn with_library_lock<R>(f: impl FnOnce() -> R) -> R {
    // The guarded value is `()`, so a poisoned lock carries no broken state.
    let _guard = LIBRARY_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    f()
}

/// Renders PDF pages with PDFium, one document at a time per process.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library_path: Option<String>,
    dpi: u16,
}

impl PdfiumRasterizer {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            library_path: config.pdfium_library_path.clone(),
            dpi: config.dpi,
        }
    }

    pub fn dpi(&self) -> u16 {
        self.dpi
    }

    fn bind(&self) -> Result<Pdfium> {
        let bindings = match &self.library_path {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                    .or_else(|_| Pdfium::bind_to_system_library())
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PageliftError::DocumentOpen(format!("Failed to load PDFium library: {e:?}")))?;

        Ok(Pdfium::new(bindings))
    }

    fn scale(&self) -> f32 {
        f32::from(self.dpi) / POINTS_PER_INCH
    }
}

fn bitmap_to_rgb(bitmap: &PdfBitmap, ordinal: u32) -> Result<DynamicImage> {
    let width = bitmap.width() as u32;
    let height = bitmap.height() as u32;
    let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
        PageliftError::Render(format!(
            "Page {ordinal} bitmap does not match its {width}x{height} size"
        ))
    })?;

    Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()))
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, path: &Path, visitor: &mut dyn PageVisitor) -> Result<()> {
        with_library_lock(|| self.render_document(path, visitor))
    }
}

impl PdfiumRasterizer {
    fn render_document(&self, path: &Path, visitor: &mut dyn PageVisitor) -> Result<()> {
        let pdfium = self.bind()?;
        let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
            PageliftError::DocumentOpen(format!("Failed to open {}: {e:?}", path.display()))
        })?;

        let pages = document.pages();
        visitor.opened(u32::from(pages.len()));

        let render_config = PdfRenderConfig::new().scale_page_by_factor(self.scale());

        for (index, page) in pages.iter().enumerate() {
            let ordinal = index as u32 + 1;
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                PageliftError::Render(format!("Failed to render page {ordinal}: {e:?}"))
            })?;
            let image = bitmap_to_rgb(&bitmap, ordinal)?;
            debug!(
                page = ordinal,
                width = image.width(),
                height = image.height(),
                dpi = self.dpi,
                "Rendered page"
            );

            visitor.page(RasterPage { ordinal, image })?;
        }

        Ok(())
    }
}
