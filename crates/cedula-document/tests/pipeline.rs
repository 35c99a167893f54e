// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end tests: normalize a photograph on disk, then extract text from the
// normalized file with a stand-in recognizer.

use std::path::Path;

use cedula_core::config::{NormalizerSettings, PipelineConfig};
use cedula_core::{CedulaError, RecognitionParams};
use cedula_document::{TextExtractor, TextRecognizer, normalize};
use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::TempDir;

/// Echoes the size of every image it is shown.
struct SizeEcho;

impl TextRecognizer for SizeEcho {
    fn name(&self) -> &'static str {
        "size-echo"
    }

    fn recognize(&self, image: &GrayImage, _params: &RecognitionParams) -> cedula_core::error::Result<String> {
        Ok(format!("AREA {}x{}", image.width(), image.height()))
    }
}

fn write_photo(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
    let photo = RgbImage::from_fn(width, height, |x, y| {
        if (y / 10) % 2 == 0 && x > width / 8 && x < width - width / 8 {
            Rgb([30, 30, 60])
        } else {
            Rgb([210, 200, 180])
        }
    });
    let path = dir.join(name);
    photo.save(&path).unwrap();
    path
}

#[test]
fn normalize_then_extract() {
    let dir = TempDir::new().unwrap();
    let input = write_photo(dir.path(), "cedula.png", 500, 315);

    let report = normalize(&input, &NormalizerSettings::default()).unwrap();
    assert_eq!(report.processed_path, dir.path().join("cedula_processed.jpg"));
    assert_eq!(report.original_size.to_string(), "500x315");
    assert_eq!(report.processed_size.to_string(), "1000x630");
    assert!(report.processed_path.is_file());

    let extractor = TextExtractor::new(Box::new(SizeEcho), &PipelineConfig::default()).unwrap();
    let extraction = extractor.extract_path(&report.processed_path).unwrap();
    assert_eq!(
        extraction.text,
        "AREA 1000x630\nAREA 400x94\nAREA 800x63\nAREA 800x63\nAREA 800x189"
    );
    assert_eq!(extraction.cleaned_length, extraction.text.chars().count());
}

#[test]
fn square_photo_is_upscaled_to_a_square() {
    let dir = TempDir::new().unwrap();
    let input = write_photo(dir.path(), "square.jpg", 200, 200);

    let report = normalize(&input, &NormalizerSettings::default()).unwrap();
    assert_eq!(report.processed_size.to_string(), "1000x1000");

    let written = image::open(&report.processed_path).unwrap();
    assert_eq!((written.width(), written.height()), (1000, 1000));
}

#[test]
fn normalized_output_is_binary_grayscale() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("flat.png");
    GrayImage::from_pixel(1200, 700, Luma([128])).save(&input).unwrap();

    let report = normalize(&input, &NormalizerSettings::default()).unwrap();
    assert_eq!(report.processed_size, report.original_size);

    let written = image::open(&report.processed_path).unwrap();
    assert_eq!(written.color(), image::ColorType::L8);
}

#[test]
fn missing_input_fails_both_stages_with_the_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.jpg");

    let err = normalize(&missing, &NormalizerSettings::default()).unwrap_err();
    assert!(matches!(err, CedulaError::FileNotFound(_)));
    assert!(err.to_string().contains("nope.jpg"));
    assert!(!dir.path().join("nope_processed.jpg").exists());

    let extractor = TextExtractor::new(Box::new(SizeEcho), &PipelineConfig::default()).unwrap();
    let err = extractor.extract_path(&missing).unwrap_err();
    assert!(err.to_string().contains("nope.jpg"));
}

#[test]
fn undecodable_input_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.jpg");
    std::fs::write(&input, b"definitely not an image").unwrap();

    let err = normalize(&input, &NormalizerSettings::default()).unwrap_err();
    assert!(matches!(err, CedulaError::Decode { .. }));
    assert!(!dir.path().join("notes_processed.jpg").exists());
}

#[test]
fn tiny_image_extracts_without_regions() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("dot.png");
    GrayImage::from_pixel(2, 2, Luma([0])).save(&input).unwrap();

    let extractor = TextExtractor::new(Box::new(SizeEcho), &PipelineConfig::default()).unwrap();
    let extraction = extractor.extract_path(&input).unwrap();
    assert_eq!(extraction.text, "AREA 2x2");
}
