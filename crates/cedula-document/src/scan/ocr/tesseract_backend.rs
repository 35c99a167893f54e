// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// libtesseract backend. Every call gets a fresh engine handle, so the
// recognizer holds no mutable state between the whole-image and region passes.

use std::path::PathBuf;

use cedula_core::error::{CedulaError, Result};
use cedula_core::{EngineMode, PageSegmentation, RecognitionParams};
use image::GrayImage;
use tesseract::{OcrEngineMode, PageSegMode, Tesseract};
use tracing::{debug, instrument};

use super::TextRecognizer;

/// [`TextRecognizer`] backed by libtesseract.
#[derive(Debug, Clone, Default)]
pub struct TesseractRecognizer {
    /// `tessdata` directory; `None` lets libtesseract use its compiled-in default.
    datapath: Option<String>,
}

impl TesseractRecognizer {
    pub fn new(tessdata_dir: Option<PathBuf>) -> Self {
        Self {
            datapath: tessdata_dir.map(|dir| dir.to_string_lossy().into_owned()),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    #[instrument(skip_all, fields(
        width = image.width(),
        height = image.height(),
        page_mode = ?params.page_mode,
    ))]
    fn recognize(&self, image: &GrayImage, params: &RecognitionParams) -> Result<String> {
        let (width, height) = image.dimensions();
        let language = params.language_spec();

        let mut tess = Tesseract::new_with_oem(
            self.datapath.as_deref(),
            Some(language.as_str()),
            engine_mode(params.engine_mode),
        )
        .map_err(|err| {
            CedulaError::Ocr(format!("failed to initialise tesseract for {}: {}", language, err))
        })?;
        tess.set_page_seg_mode(page_seg_mode(params.page_mode));

        let mut tess = tess
            .set_frame(image.as_raw(), width as i32, height as i32, 1, width as i32)
            .map_err(|err| {
                CedulaError::Ocr(format!("failed to set {}x{} frame: {}", width, height, err))
            })?;

        let text = tess
            .get_text()
            .map_err(|err| CedulaError::Ocr(format!("tesseract recognition failed: {}", err)))?;

        debug!(char_count = text.chars().count(), "tesseract recognition complete");
        Ok(text)
    }
}

fn engine_mode(mode: EngineMode) -> OcrEngineMode {
    match mode {
        EngineMode::Default => OcrEngineMode::Default,
        EngineMode::NeuralOnly => OcrEngineMode::LstmOnly,
        EngineMode::LegacyOnly => OcrEngineMode::TesseractOnly,
    }
}

fn page_seg_mode(mode: PageSegmentation) -> PageSegMode {
    match mode {
        PageSegmentation::Auto => PageSegMode::PsmAuto,
        PageSegmentation::SingleBlock => PageSegMode::PsmSingleBlock,
        PageSegmentation::SingleLine => PageSegMode::PsmSingleLine,
        PageSegmentation::SingleWord => PageSegMode::PsmSingleWord,
    }
}
