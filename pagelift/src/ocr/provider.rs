use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat};
use leptess::LepTess;
use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::error::{PageliftError, Result};

use super::osd::TesseractOsd;

/// The OCR engine as seen by the pipeline.
///
/// Both calls are blocking and are expected to run off the async runtime.
pub trait OcrEngine: Send + Sync {
    /// Rotation in degrees reported by orientation and script detection.
    fn detect_rotation(&self, image: &DynamicImage) -> Result<i32>;

    /// Full-page text recognition. An empty string is a valid result.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

enum OcrBackend {
    Local {
        tesseract: Arc<Mutex<LepTess>>,
        osd: TesseractOsd,
    },
    Unavailable {
        reason: String,
    },
}

pub struct OcrProvider {
    backend: OcrBackend,
    dpi: u16,
}

fn create_tesseract(data_path: Option<&str>, languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(data_path, languages).map_err(|e| e.to_string())
}

pub(crate) fn encode_png(image: &DynamicImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut output = Vec::new();
    image.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

impl OcrProvider {
    pub fn new(config: &OcrConfig, dpi: u16) -> Self {
        let backend = match create_tesseract(config.data_path.as_deref(), &config.languages) {
            Ok(lt) => {
                info!(languages = %config.languages, "Tesseract OCR initialized");
                OcrBackend::Local {
                    tesseract: Arc::new(Mutex::new(lt)),
                    osd: TesseractOsd::new(&config.tesseract_cmd, config.data_path.clone()),
                }
            }
            Err(e) => {
                let reason = format!("Tesseract not available: {e}");
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        };

        Self { backend, dpi }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }
}

impl OcrEngine for OcrProvider {
    fn detect_rotation(&self, image: &DynamicImage) -> Result<i32> {
        match &self.backend {
            OcrBackend::Local { osd, .. } => {
                let png = encode_png(image).map_err(|e| {
                    PageliftError::OrientationDetection(format!("Failed to encode image: {e}"))
                })?;
                osd.detect(&png)
            }
            OcrBackend::Unavailable { reason } => {
                Err(PageliftError::OrientationDetection(reason.clone()))
            }
        }
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        match &self.backend {
            OcrBackend::Local { tesseract, .. } => {
                let png = encode_png(image)
                    .map_err(|e| PageliftError::Ocr(format!("Failed to encode image: {e}")))?;

                let mut lt = tesseract
                    .lock()
                    .map_err(|_| PageliftError::Ocr("Tesseract handle poisoned".to_string()))?;
                lt.set_image_from_mem(&png)
                    .map_err(|e| PageliftError::Ocr(format!("Failed to set image: {e}")))?;
                lt.set_source_resolution(i32::from(self.dpi));
                lt.get_utf8_text()
                    .map_err(|e| PageliftError::Ocr(format!("Failed to extract text: {e}")))
            }
            OcrBackend::Unavailable { reason } => Err(PageliftError::OcrUnavailable(reason.clone())),
        }
    }
}
