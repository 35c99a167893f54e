// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration: normalizer constants, OCR selectors, region table
// and noise-pattern table. Defaults reproduce the tuned cedula layout; a JSON
// file can override any part of it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CedulaError, Result};
use crate::types::{EngineMode, OcrBackend, PageSegmentation, RecognitionParams, RegionDescriptor};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "CEDULA_OCR_CONFIG";

/// Complete configuration for both pipeline components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub normalizer: NormalizerSettings,
    pub extractor: ExtractorSettings,
    /// Expected field positions on the card, as fractions of the image.
    pub regions: Vec<RegionDescriptor>,
    /// Regular expressions matched against lowercased lines; a match marks the
    /// line as noise.
    pub noise_patterns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerSettings::default(),
            extractor: ExtractorSettings::default(),
            regions: default_regions(),
            noise_patterns: default_noise_patterns(),
        }
    }
}

/// Image Normalizer tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    /// Images narrower than this are upscaled to exactly this width.
    pub min_width: u32,
    pub clahe_clip_limit: f32,
    /// Tiles per axis for adaptive histogram equalization.
    pub clahe_tile_grid: u32,
    /// Bilateral neighbourhood diameter in pixels.
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    /// Side of the square threshold neighbourhood. Must be odd.
    pub threshold_block_size: u32,
    /// Subtracted from the local weighted mean.
    pub threshold_offset: f32,
    /// Structuring-element radius for the close/open cleanup; 0 is the 1x1 element.
    pub morphology_radius: u8,
    pub jpeg_quality: u8,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            min_width: 1000,
            clahe_clip_limit: 4.0,
            clahe_tile_grid: 16,
            bilateral_diameter: 15,
            bilateral_sigma_color: 100.0,
            bilateral_sigma_space: 100.0,
            threshold_block_size: 21,
            threshold_offset: 10.0,
            morphology_radius: 0,
            jpeg_quality: 95,
        }
    }
}

/// Text Extractor OCR selectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub backend: OcrBackend,
    pub engine_mode: EngineMode,
    /// Page segmentation for the whole-image pass.
    pub page_mode: PageSegmentation,
    /// Page segmentation for the per-region pass.
    pub region_page_mode: PageSegmentation,
    pub languages: Vec<String>,
    /// Directory holding `*.traineddata`; `None` uses the engine default.
    pub tessdata_dir: Option<PathBuf>,
    /// Directory holding the `ocrs` detection/recognition models.
    pub ocrs_model_dir: Option<PathBuf>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            engine_mode: EngineMode::Default,
            page_mode: PageSegmentation::SingleBlock,
            region_page_mode: PageSegmentation::SingleWord,
            languages: vec!["spa".to_string(), "eng".to_string()],
            tessdata_dir: None,
            ocrs_model_dir: None,
        }
    }
}

impl ExtractorSettings {
    pub fn full_page_params(&self) -> RecognitionParams {
        RecognitionParams {
            engine_mode: self.engine_mode,
            page_mode: self.page_mode,
            languages: self.languages.clone(),
        }
    }

    pub fn region_params(&self) -> RecognitionParams {
        RecognitionParams {
            engine_mode: self.engine_mode,
            page_mode: self.region_page_mode,
            languages: self.languages.clone(),
        }
    }
}

/// Default field layout: document number, given names, surnames, and the
/// lower block holding the remaining fields.
pub fn default_regions() -> Vec<RegionDescriptor> {
    vec![
        RegionDescriptor::new("document_number", 0.3, 0.1, 0.4, 0.15),
        RegionDescriptor::new("given_names", 0.1, 0.3, 0.8, 0.1),
        RegionDescriptor::new("surnames", 0.1, 0.4, 0.8, 0.1),
        RegionDescriptor::new("supplementary", 0.1, 0.6, 0.8, 0.3),
    ]
}

/// Tooling names, OS paths, URLs, and processing/extraction log chatter.
pub fn default_noise_patterns() -> Vec<String> {
    [
        r"tesseract|ocr|python|cv2",
        r"program files|windows|system",
        r"http|www|\.com|\.org",
        r"preprocesando|imagen|procesada|guardada",
        r"extrayendo texto|texto extraído|analizando",
    ]
    .iter()
    .map(|pattern| pattern.to_string())
    .collect()
}

impl PipelineConfig {
    /// Read a JSON config file. Absent fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|err| {
            CedulaError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|err| {
            CedulaError::Config(format!("cannot parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `CEDULA_OCR_CONFIG`, or use defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let n = &self.normalizer;
        if n.min_width == 0 {
            return Err(CedulaError::Config("min_width must be positive".into()));
        }
        if n.clahe_clip_limit.is_nan() || n.clahe_clip_limit <= 0.0 {
            return Err(CedulaError::Config("clahe_clip_limit must be positive".into()));
        }
        if n.clahe_tile_grid == 0 {
            return Err(CedulaError::Config("clahe_tile_grid must be positive".into()));
        }
        if n.bilateral_diameter == 0 {
            return Err(CedulaError::Config("bilateral_diameter must be positive".into()));
        }
        if [n.bilateral_sigma_color, n.bilateral_sigma_space]
            .iter()
            .any(|sigma| sigma.is_nan() || *sigma <= 0.0)
        {
            return Err(CedulaError::Config("bilateral sigmas must be positive".into()));
        }
        if n.threshold_block_size < 3 || n.threshold_block_size % 2 == 0 {
            return Err(CedulaError::Config(format!(
                "threshold_block_size must be odd and at least 3, got {}",
                n.threshold_block_size
            )));
        }
        if !(1..=100).contains(&n.jpeg_quality) {
            return Err(CedulaError::Config(format!(
                "jpeg_quality must be in 1..=100, got {}",
                n.jpeg_quality
            )));
        }

        if self.extractor.languages.is_empty() {
            return Err(CedulaError::Config("at least one OCR language is required".into()));
        }

        let unit = 0.0f64..=1.0;
        for region in &self.regions {
            let fractions = [region.x, region.y, region.width, region.height];
            if !fractions.iter().all(|f| unit.contains(f)) {
                return Err(CedulaError::Config(format!(
                    "region {} has a fraction outside [0, 1]",
                    region.label
                )));
            }
        }

        Ok(())
    }
}
