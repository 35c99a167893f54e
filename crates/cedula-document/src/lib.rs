// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cedula-document: Image processing for Cedula OCR.
//
// Provides image decoding and resampling, the card normalization pipeline
// (contrast equalization, denoising, binarization, sharpening), region-based
// text extraction over a pluggable OCR backend, and OCR text cleaning.

pub mod image;
pub mod scan;
pub mod text;

// Re-export the primary entry points so callers can use `cedula_document::normalize` etc.
pub use self::image::processor::ImageProcessor;
pub use scan::enhance::{CardNormalizer, normalize};
pub use scan::extract::TextExtractor;
pub use scan::ocr::{TextRecognizer, build_recognizer};
pub use text::clean::TextCleaner;
