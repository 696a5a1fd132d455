//! OCR (Optical Character Recognition) Module
//!
//! Text recognition and page orientation for rasterized document pages.
//!
//! # Architecture
//!
//! - `OcrEngine` trait is the seam the pipeline depends on
//! - `OcrProvider` implements it with Tesseract: text via leptess, orientation
//!   and script detection (OSD) via the `tesseract` binary in `--psm 0` mode
//! - `OrientationCorrector` applies the detected rotation and swallows every
//!   detection failure, so a page without usable layout is still recognized
//!
//! # Configuration
//!
//! Controlled via `OcrConfig` (see `config.rs`):
//! - `languages`: Tesseract language codes joined by `+`
//! - `data_path`: tessdata directory, defaults to the system location
//! - `tesseract_cmd`: binary used for OSD

mod orientation;
mod osd;
mod provider;

pub use orientation::{rotate_clockwise, OrientationCorrector};
pub use osd::{parse_rotation, TesseractOsd};
pub use provider::{OcrEngine, OcrProvider};
