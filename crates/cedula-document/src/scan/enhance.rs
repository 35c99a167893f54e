// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card normalization pipeline: grayscale, upscale, local contrast, bilateral
// denoise, adaptive binarization, speckle cleanup and sharpening for ID-card
// photographs headed to OCR.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cedula_core::config::NormalizerSettings;
use cedula_core::error::{CedulaError, Result};
use cedula_core::{ImageDimensions, NormalizeReport};
use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::filter3x3;
use imageproc::morphology::{close, open};
use tracing::{debug, info, instrument};

use crate::image::processor::ImageProcessor;
use crate::scan::filters::{SHARPEN_KERNEL, adaptive_gaussian_threshold, bilateral_filter, clahe};

/// Suffix inserted before the extension of the normalized output file.
pub const PROCESSED_SUFFIX: &str = "_processed";

/// Normalizes a document photograph for OCR.
///
/// Each stage consumes `self` and returns the next state, in this fixed order:
/// grayscale, upscale-if-small, local contrast, denoise, binarize, speckle
/// cleanup, sharpen. [`run`](Self::run) applies them all.
pub struct CardNormalizer {
    /// The working grayscale buffer.
    image: GrayImage,
    settings: NormalizerSettings,
}

impl CardNormalizer {
    // -- Construction ---------------------------------------------------------

    /// Decode a photograph from disk and convert it to grayscale.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, settings: NormalizerSettings) -> Result<Self> {
        let gray = ImageProcessor::open(path)?.grayscale().into_luma8();
        Ok(Self {
            image: gray,
            settings,
        })
    }

    /// Wrap an already-decoded image, converting it to grayscale.
    pub fn from_dynamic(image: DynamicImage, settings: NormalizerSettings) -> Self {
        Self {
            image: ImageProcessor::from_dynamic(image).grayscale().into_luma8(),
            settings,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.image.width(), self.image.height())
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_gray(self) -> GrayImage {
        self.image
    }

    // -- Stages ---------------------------------------------------------------

    /// Upscale to `min_width` when narrower; never downscale.
    #[instrument(skip(self))]
    pub fn upscale_if_small(self) -> Result<Self> {
        let min_width = self.settings.min_width;
        let image = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(self.image))
            .upscale_to_width(min_width)?
            .into_luma8();
        Ok(Self { image, ..self })
    }

    /// Contrast-limited adaptive histogram equalization.
    #[instrument(skip(self))]
    pub fn equalize_local_contrast(self) -> Self {
        let (clip, grid) = (self.settings.clahe_clip_limit, self.settings.clahe_tile_grid);
        info!(clip_limit = clip, tile_grid = grid, "Equalizing local contrast");
        let image = clahe(&self.image, clip, grid);
        Self { image, ..self }
    }

    /// Bilateral smoothing: removes sensor noise, keeps stroke edges.
    #[instrument(skip(self))]
    pub fn denoise(self) -> Self {
        let s = &self.settings;
        info!(
            diameter = s.bilateral_diameter,
            sigma_color = s.bilateral_sigma_color,
            sigma_space = s.bilateral_sigma_space,
            "Applying bilateral filter"
        );
        let image = bilateral_filter(
            &self.image,
            s.bilateral_diameter,
            s.bilateral_sigma_color,
            s.bilateral_sigma_space,
        );
        Self { image, ..self }
    }

    /// Gaussian-weighted adaptive thresholding to pure black and white.
    #[instrument(skip(self))]
    pub fn binarize(self) -> Self {
        let (block, offset) = (self.settings.threshold_block_size, self.settings.threshold_offset);
        info!(block_size = block, offset, "Applying adaptive binarization");
        let image = adaptive_gaussian_threshold(&self.image, block, offset);
        debug!(
            black = image.pixels().filter(|p| p.0[0] == 0).count(),
            "Binarization complete"
        );
        Self { image, ..self }
    }

    /// Morphological close followed by open to drop binarization speckle.
    #[instrument(skip(self))]
    pub fn remove_speckle(self) -> Self {
        let radius = self.settings.morphology_radius;
        info!(radius, "Applying close/open cleanup");
        let closed = close(&self.image, Norm::LInf, radius);
        let image = open(&closed, Norm::LInf, radius);
        Self { image, ..self }
    }

    /// High-pass sharpening of character edges.
    #[instrument(skip(self))]
    pub fn sharpen(self) -> Self {
        info!("Sharpening");
        let image = filter3x3::<_, i32, u8>(&self.image, &SHARPEN_KERNEL);
        Self { image, ..self }
    }

    // -- Pipeline -------------------------------------------------------------

    /// Run every stage after grayscale conversion, in order.
    ///
    /// Fails on a zero-area buffer; nothing is written by this method.
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn run(self) -> Result<Self> {
        if self.image.width() == 0 || self.image.height() == 0 {
            return Err(CedulaError::Processing(format!(
                "cannot normalize a zero-area image ({})",
                self.dimensions()
            )));
        }

        info!("Running card normalization pipeline");
        let normalized = self
            .upscale_if_small()?
            .equalize_local_contrast()
            .denoise()
            .binarize()
            .remove_speckle()
            .sharpen();

        debug!(size = %normalized.dimensions(), "Normalization complete");
        Ok(normalized)
    }

    /// Write the working buffer as JPEG.
    pub fn save(&self, path: &Path) -> Result<()> {
        ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(self.image.clone()))
            .save_jpeg(path, self.settings.jpeg_quality)
    }
}

/// Derive `<dir>/<stem>_processed.jpg` from an input path.
///
/// The extension is always `.jpg`, whatever the input's. Fails when the input
/// has no file name or when the derived path would be the input itself.
pub fn processed_path_for(input: &Path) -> Result<PathBuf> {
    let stem = input.file_stem().ok_or_else(|| {
        CedulaError::Processing(format!("{} has no file name", input.display()))
    })?;

    let mut name = OsString::from(stem);
    name.push(PROCESSED_SUFFIX);
    name.push(".jpg");
    let output = input.with_file_name(name);

    if output == input {
        return Err(CedulaError::Processing(format!(
            "refusing to overwrite the original file {}",
            input.display()
        )));
    }
    Ok(output)
}

/// Normalize the photograph at `image_path` and write the result alongside it.
///
/// Either every stage completes and the output file is written, or an error is
/// returned and no output file exists.
#[instrument(skip(settings), fields(path = %image_path.display()))]
pub fn normalize(image_path: &Path, settings: &NormalizerSettings) -> Result<NormalizeReport> {
    let normalizer = CardNormalizer::open(image_path, settings.clone())?;
    let original_size = normalizer.dimensions();
    let processed_path = processed_path_for(image_path)?;

    let normalized = normalizer.run()?;
    let processed_size = normalized.dimensions();
    normalized.save(&processed_path)?;

    info!(
        processed = %processed_path.display(),
        %original_size,
        %processed_size,
        "Normalized image saved"
    );
    Ok(NormalizeReport {
        processed_path,
        original_size,
        processed_size,
    })
}

// -- Tests --------------------------------------------------------------------
