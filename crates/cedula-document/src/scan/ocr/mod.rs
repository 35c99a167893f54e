// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR seam: the `TextRecognizer` trait the extractor drives, and the
// backends behind it.
//
// # Feature Gates
//
// Both engines are optional so the crate builds without native libraries:
//
// - `tesseract`: libtesseract via the `tesseract` crate. Honours engine mode,
//   page-segmentation mode and the language set. Needs the `spa` and `eng`
//   traineddata files installed.
// - `ocr`: the pure-Rust `ocrs` engine. Language set and page segmentation
//   are fixed by its models.
//
// ```toml
// cedula-document = { path = "crates/cedula-document", features = ["tesseract"] }
// ```

#[cfg(feature = "ocr")]
pub mod ocrs_backend;
#[cfg(feature = "tesseract")]
pub mod tesseract_backend;

use cedula_core::config::ExtractorSettings;
use cedula_core::error::{CedulaError, Result};
use cedula_core::{OcrBackend, RecognitionParams};
use image::GrayImage;

#[cfg(feature = "ocr")]
pub use ocrs_backend::OcrsRecognizer;
#[cfg(feature = "tesseract")]
pub use tesseract_backend::TesseractRecognizer;

/// A black-box OCR engine: image in, text out.
pub trait TextRecognizer {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Recognize all text in `image`.
    fn recognize(&self, image: &GrayImage, params: &RecognitionParams) -> Result<String>;
}

/// Construct the backend selected in `settings`.
///
/// Fails with [`CedulaError::Ocr`] when that backend was not compiled in or
/// cannot initialise.
pub fn build_recognizer(settings: &ExtractorSettings) -> Result<Box<dyn TextRecognizer>> {
    match settings.backend {
        OcrBackend::Tesseract => build_tesseract(settings),
        OcrBackend::Ocrs => build_ocrs(settings),
    }
}

#[cfg(feature = "tesseract")]
fn build_tesseract(settings: &ExtractorSettings) -> Result<Box<dyn TextRecognizer>> {
    Ok(Box::new(TesseractRecognizer::new(settings.tessdata_dir.clone())))
}

#[cfg(not(feature = "tesseract"))]
fn build_tesseract(_settings: &ExtractorSettings) -> Result<Box<dyn TextRecognizer>> {
    Err(CedulaError::Ocr(
        "the tesseract backend is not compiled in; rebuild with `--features tesseract`".into(),
    ))
}

#[cfg(feature = "ocr")]
fn build_ocrs(settings: &ExtractorSettings) -> Result<Box<dyn TextRecognizer>> {
    let config = match &settings.ocrs_model_dir {
        Some(dir) => ocrs_backend::OcrConfig::from_dir(dir),
        None => ocrs_backend::OcrConfig::default(),
    };
    Ok(Box::new(OcrsRecognizer::new(config)?))
}

#[cfg(not(feature = "ocr"))]
fn build_ocrs(_settings: &ExtractorSettings) -> Result<Box<dyn TextRecognizer>> {
    Err(CedulaError::Ocr(
        "the ocrs backend is not compiled in; rebuild with `--features ocr`".into(),
    ))
}
