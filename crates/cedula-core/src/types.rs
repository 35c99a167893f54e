// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: image dimensions, region descriptors, OCR selectors and
// the result record written at the process boundary.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::CedulaError;

/// Width and height of a pixel buffer. Serialized as `"<width>x<height>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Serialize for ImageDimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A rectangle locating an expected text field, expressed as fractions of the
/// full image's width and height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    /// Field name, used only for logging.
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RegionDescriptor {
    pub fn new(label: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            width,
            height,
        }
    }
}

/// A region resolved to absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// OCR engine mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Whatever the engine has available: neural and legacy recognizers combined.
    #[default]
    Default,
    /// Neural recognizer only.
    NeuralOnly,
    /// Legacy recognizer only.
    LegacyOnly,
}

/// Page-segmentation mode: the layout granularity the engine should assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegmentation {
    /// Fully automatic layout analysis.
    Auto,
    /// A single uniform block of text.
    SingleBlock,
    /// A single text line.
    SingleLine,
    /// A single word.
    SingleWord,
}

/// Which OCR backend the extractor drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// libtesseract, honouring engine mode, page segmentation and languages.
    #[default]
    Tesseract,
    /// The pure-Rust `ocrs` engine.
    Ocrs,
}

/// Parameters for a single recognition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionParams {
    pub engine_mode: EngineMode,
    pub page_mode: PageSegmentation,
    /// Language codes, e.g. `["spa", "eng"]`.
    pub languages: Vec<String>,
}

impl RecognitionParams {
    /// Language set in the `spa+eng` form OCR engines expect.
    pub fn language_spec(&self) -> String {
        self.languages.join("+")
    }
}

/// Success payload of the Image Normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub processed_path: PathBuf,
    pub original_size: ImageDimensions,
    pub processed_size: ImageDimensions,
}

/// Success payload of the Text Extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub text: String,
    /// Character count of the combined raw OCR text.
    pub original_length: usize,
    /// Character count of the cleaned text.
    pub cleaned_length: usize,
}

/// The structured contract at the system boundary: exactly one of a success
/// payload or a single failure message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultRecord<T> {
    Success {
        success: bool,
        #[serde(flatten)]
        payload: T,
    },
    Failure {
        error: String,
    },
}

impl<T> ResultRecord<T> {
    pub fn success(payload: T) -> Self {
        Self::Success {
            success: true,
            payload,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    /// Convert the first fault of a pipeline run into the failure shape.
    pub fn from_result(result: Result<T, CedulaError>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => Self::failure(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dimensions_serialize_as_w_x_h() {
        let dims = ImageDimensions::new(1000, 631);
        assert_eq!(dims.to_string(), "1000x631");
        assert_eq!(serde_json::to_value(dims).unwrap(), json!("1000x631"));
    }

    #[test]
    fn normalize_success_record_shape() {
        let record = ResultRecord::success(NormalizeReport {
            processed_path: PathBuf::from("/tmp/card_processed.jpg"),
            original_size: ImageDimensions::new(500, 500),
            processed_size: ImageDimensions::new(1000, 1000),
        });
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "success": true,
                "processedPath": "/tmp/card_processed.jpg",
                "originalSize": "500x500",
                "processedSize": "1000x1000",
            })
        );
    }

    #[test]
    fn extraction_success_record_shape() {
        let record = ResultRecord::success(ExtractionReport {
            text: "REPUBLICA DE COLOMBIA".into(),
            original_length: 40,
            cleaned_length: 21,
        });
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "success": true,
                "text": "REPUBLICA DE COLOMBIA",
                "original_length": 40,
                "cleaned_length": 21,
            })
        );
    }

    #[test]
    fn failure_record_carries_only_the_message() {
        let result: Result<ExtractionReport, _> =
            Err(CedulaError::FileNotFound(PathBuf::from("/no/such/file.jpg")));
        let record = ResultRecord::from_result(result);
        assert!(!record.is_success());
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "error": "file not found: /no/such/file.jpg" })
        );
    }

    #[test]
    fn language_spec_joins_with_plus() {
        let params = RecognitionParams {
            engine_mode: EngineMode::Default,
            page_mode: PageSegmentation::SingleBlock,
            languages: vec!["spa".into(), "eng".into()],
        };
        assert_eq!(params.language_spec(), "spa+eng");
    }
}
