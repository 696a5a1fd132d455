use std::sync::Arc;

use crate::config::Config;
use crate::ocr::OcrEngine;
use crate::processing::ProcessingPipeline;
use crate::raster::PageRasterizer;
use crate::storage::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: ProcessingPipeline,
    /// Whether the text engine loaded. Reported by the health check only;
    /// events are still accepted and fail at extraction.
    pub ocr_available: bool,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn BlobStore>,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrEngine>,
        ocr_available: bool,
    ) -> Self {
        let config = Arc::new(config);
        let pipeline = ProcessingPipeline::new(store, rasterizer, ocr, &config.processing);

        Self {
            config,
            pipeline,
            ocr_available,
        }
    }
}
