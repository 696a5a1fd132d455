//! Page rasterization.
//!
//! A [`PageRasterizer`] opens a document and pushes one RGB image per page,
//! in physical order, into a [`PageVisitor`]. Rendering is blocking; callers
//! run it inside `spawn_blocking`.

mod pdfium;

use std::path::Path;

use crate::error::Result;
use crate::models::RasterPage;

pub use pdfium::PdfiumRasterizer;

/// Receives rasterized pages. Returning an error stops rasterization.
pub trait PageVisitor {
    /// Called once, after the document was parsed and before the first page.
    fn opened(&mut self, _page_count: u32) {}

    fn page(&mut self, page: RasterPage) -> Result<()>;
}

pub trait PageRasterizer: Send + Sync {
    /// Fails with `DocumentOpen` when the document cannot be parsed; no page
    /// is visited in that case.
    fn rasterize(&self, path: &Path, visitor: &mut dyn PageVisitor) -> Result<()>;
}
