// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, grayscale, upscale and atomic JPEG output.
// Operates on in-memory images using the `image` crate.

use std::io::{BufWriter, Write};
use std::path::Path;

use cedula_core::error::{CedulaError, Result};
use cedula_core::ImageDimensions;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageReader};
use tracing::{debug, info, instrument};

/// Largest image, in pixels, that upscaling may produce.
pub const MAX_UPSCALED_PIXELS: u64 = 64_000_000;

/// Codec wrapper around a single decoded photograph.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// chain the same way the normalizer stages do.
///
/// ```ignore
/// let gray = ImageProcessor::open("cedula.jpg")?
///     .grayscale()
///     .upscale_to_width(1000)?
///     .into_luma8();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an image file.
    ///
    /// A missing file and an undecodable file are reported as distinct
    /// errors. The format is sniffed from the file contents, not the extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CedulaError::FileNotFound(path.to_path_buf()));
        }

        let decode_error = |reason: String| CedulaError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let img = ImageReader::open(path)
            .map_err(|err| decode_error(err.to_string()))?
            .with_guessed_format()
            .map_err(|err| decode_error(err.to_string()))?
            .decode()
            .map_err(|err| decode_error(err.to_string()))?;

        if img.width() == 0 || img.height() == 0 {
            return Err(decode_error("image has zero area".into()));
        }

        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.image.width(), self.image.height())
    }

    /// Consume the processor and return the image as 8-bit luma.
    pub fn into_luma8(self) -> GrayImage {
        match self.image {
            DynamicImage::ImageLuma8(gray) => gray,
            other => other.to_luma8(),
        }
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Collapse color channels to a single 8-bit intensity channel.
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        info!("Converting to grayscale");
        Self {
            image: DynamicImage::ImageLuma8(self.into_luma8()),
        }
    }

    /// Upscale so the width is at least `min_width`, preserving aspect ratio.
    ///
    /// Images already at least `min_width` wide are returned unchanged; this
    /// never downscales. Uses Lanczos3 resampling. Fails with
    /// [`CedulaError::Processing`] when the result would exceed
    /// [`MAX_UPSCALED_PIXELS`].
    #[instrument(skip(self), fields(min_width))]
    pub fn upscale_to_width(self, min_width: u32) -> Result<Self> {
        let (width, height) = (self.image.width(), self.image.height());
        if width == 0 || width >= min_width {
            return Ok(self);
        }

        let scale = min_width as f64 / width as f64;
        let new_height = (height as f64 * scale).round().max(1.0);
        if new_height * min_width as f64 > MAX_UPSCALED_PIXELS as f64 {
            return Err(CedulaError::Processing(format!(
                "upscaling {}x{} to width {} would exceed {} pixels",
                width, height, min_width, MAX_UPSCALED_PIXELS
            )));
        }
        let new_height = new_height as u32;
        info!(
            from_w = width,
            from_h = height,
            to_w = min_width,
            to_h = new_height,
            "Upscaling image"
        );

        let resized = self
            .image
            .resize_exact(min_width, new_height, FilterType::Lanczos3);
        Ok(Self { image: resized })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the image as JPEG and write it to `path`.
    ///
    /// The bytes go to a temporary file in the destination directory first and
    /// are renamed into place, so a failed encode never leaves a partial file
    /// at `path`.
    #[instrument(skip(self), fields(path = %path.display(), quality))]
    pub fn save_jpeg(&self, path: &Path, quality: u8) -> Result<()> {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staging = tempfile::Builder::new()
            .prefix(".cedula-")
            .suffix(".jpg.part")
            .tempfile_in(dir)?;

        {
            let mut writer = BufWriter::new(staging.as_file_mut());
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            let encoded = match &self.image {
                DynamicImage::ImageLuma8(gray) => gray.write_with_encoder(encoder),
                other => other.to_rgb8().write_with_encoder(encoder),
            };
            encoded.map_err(|err| CedulaError::Encode(format!("JPEG encoding failed: {}", err)))?;
            writer.flush()?;
        }

        staging
            .persist(path)
            .map_err(|err| CedulaError::Io(err.error))?;
        debug!("JPEG written");
        Ok(())
    }
}
