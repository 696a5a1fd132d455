//! Pagelift turns newly uploaded PDFs into per-page text.
//!
//! A storage event names one object. The pipeline downloads it, renders every
//! page, straightens pages using orientation detection, runs Tesseract, writes
//! a processing report, uploads the results next to the source and removes
//! every local file it created.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod ocr;
pub mod processing;
pub mod raster;
pub mod storage;
