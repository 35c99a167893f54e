// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `ocrs` backend: pure-Rust OCR, neural network models executed via `rten`.
//
// # Model Setup
//
// The engine requires two model files:
//
// - **Detection model** (`text-detection.rten`): locates text regions in the image.
// - **Recognition model** (`text-recognition.rten`): decodes characters from detected regions.
//
// Running the `ocrs-cli` tool once downloads both:
//   ```sh
//   cargo install ocrs-cli
//   ocrs some-image.png  # downloads models to ~/.cache/ocrs/
//   ```
//
// The default cache directory is `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`).
// The models are Latin-alphabet only and do their own layout analysis, so the
// language set and page-segmentation mode of a request are ignored.

use std::path::{Path, PathBuf};

use cedula_core::error::{CedulaError, Result};
use cedula_core::RecognitionParams;
use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

use super::TextRecognizer;

/// Default directory for cached OCR model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs` when
/// `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Model locations for an [`OcrsRecognizer`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    /// Returns a config pointing at the default model cache directory.
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expect `text-detection.rten` and `text-recognition.rten` in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for (kind, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(CedulaError::Ocr(format!(
                    "{} model not found at {}; run `ocrs-cli` once to download models",
                    kind,
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// [`TextRecognizer`] backed by the `ocrs` engine.
///
/// Model loading is the expensive step; one recognizer serves the whole-image
/// pass and every region pass of an extraction.
pub struct OcrsRecognizer {
    engine: OcrsEngine,
}

impl OcrsRecognizer {
    /// Load both models and initialise the engine.
    ///
    /// **Note:** `ocrs` and `rten` must be compiled in release mode; debug
    /// builds are 10-100x slower.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let load = |path: &Path, kind: &str| {
            info!(kind, "Loading OCR model");
            Model::load_file(path).map_err(|err| {
                CedulaError::Ocr(format!(
                    "failed to load {} model from {}: {}",
                    kind,
                    path.display(),
                    err
                ))
            })
        };
        let detection_model = load(&config.detection_model_path, "detection")?;
        let recognition_model = load(&config.recognition_model_path, "recognition")?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| CedulaError::Ocr(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &GrayImage, params: &RecognitionParams) -> Result<String> {
        debug!(
            languages = %params.language_spec(),
            page_mode = ?params.page_mode,
            "ocrs ignores language and page-segmentation selectors"
        );

        // ocrs expects RGB8.
        let rgb = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            CedulaError::Ocr(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| CedulaError::Ocr(format!("OCR preprocessing failed: {}", err)))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| CedulaError::Ocr(format!("OCR text recognition failed: {}", err)))?;

        debug!(
            line_count = text.lines().count(),
            char_count = text.chars().count(),
            "OCR recognition complete"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_to_model_files() {
        let config = OcrConfig::default();
        assert!(config.detection_model_path.ends_with(DETECTION_MODEL_FILENAME));
        assert!(config.recognition_model_path.ends_with(RECOGNITION_MODEL_FILENAME));
    }

    #[test]
    fn config_from_dir() {
        let config = OcrConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn validate_missing_models() {
        let config = OcrConfig::from_dir("/nonexistent/path/ocr-models");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("detection model not found"));
    }
}
