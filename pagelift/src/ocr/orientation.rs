use std::sync::Arc;

use image::DynamicImage;
use tracing::{info, warn};

use super::OcrEngine;
use crate::error::PageliftError;
use crate::models::RasterPage;

/// Straightens pages using the engine's orientation detection.
///
/// Detection failures are never fatal: the page is returned unrotated.
#[derive(Clone)]
pub struct OrientationCorrector {
    engine: Arc<dyn OcrEngine>,
}

impl OrientationCorrector {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn correct(&self, page: RasterPage) -> RasterPage {
        let rotation = match self.engine.detect_rotation(&page.image) {
            Ok(rotation) => rotation,
            Err(e) => {
                warn!(
                    page = page.ordinal,
                    "Error during orientation detection on page {}: {}", page.ordinal, e
                );
                return page;
            }
        };

        if rotation.rem_euclid(360) == 0 {
            return page;
        }

        match rotate_clockwise(page.image, rotation) {
            Ok(image) => {
                info!(page = page.ordinal, "Rotated page {} by {} degrees", page.ordinal, rotation);
                RasterPage {
                    ordinal: page.ordinal,
                    image,
                }
            }
            Err((image, e)) => {
                warn!(
                    page = page.ordinal,
                    "Error during orientation detection on page {}: {}", page.ordinal, e
                );
                RasterPage {
                    ordinal: page.ordinal,
                    image,
                }
            }
        }
    }
}

/// Rotates clockwise by a right angle; the canvas swaps dimensions as needed.
/// Hands the image back untouched when the angle is not a multiple of 90.
pub fn rotate_clockwise(
    image: DynamicImage,
    degrees: i32,
) -> std::result::Result<DynamicImage, (DynamicImage, PageliftError)> {
    match degrees.rem_euclid(360) {
        0 => Ok(image),
        90 => Ok(image.rotate90()),
        180 => Ok(image.rotate180()),
        270 => Ok(image.rotate270()),
        other => Err((
            image,
            PageliftError::OrientationDetection(format!("unsupported rotation of {other} degrees")),
        )),
    }
}
