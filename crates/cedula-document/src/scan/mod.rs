// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card pipeline: normalization for OCR, field-region geometry, and text
// extraction through a pluggable OCR backend.

pub mod enhance;
pub mod extract;
pub mod filters;
pub mod ocr;
pub mod regions;

pub use enhance::{CardNormalizer, normalize};
pub use extract::TextExtractor;
pub use ocr::{TextRecognizer, build_recognizer};
