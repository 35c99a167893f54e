// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction: one whole-image OCR pass, one pass per configured field
// region, then cleaning of the combined text.

use std::path::Path;

use cedula_core::config::{ExtractorSettings, PipelineConfig};
use cedula_core::error::Result;
use cedula_core::{ExtractionReport, RegionDescriptor};
use image::GrayImage;
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::scan::ocr::TextRecognizer;
use crate::scan::regions::{crop_region, resolve_region};
use crate::text::clean::TextCleaner;

/// Extracts and cleans the text of a (normalized) document image.
pub struct TextExtractor {
    recognizer: Box<dyn TextRecognizer>,
    settings: ExtractorSettings,
    regions: Vec<RegionDescriptor>,
    cleaner: TextCleaner,
}

impl TextExtractor {
    /// Build an extractor around `recognizer` using the extractor settings,
    /// region table and noise table of `config`.
    pub fn new(recognizer: Box<dyn TextRecognizer>, config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            recognizer,
            settings: config.extractor.clone(),
            regions: config.regions.clone(),
            cleaner: TextCleaner::from_config(config)?,
        })
    }

    /// Decode the image at `path` and extract its text.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn extract_path(&self, path: &Path) -> Result<ExtractionReport> {
        let image = ImageProcessor::open(path)?.into_luma8();
        self.extract_image(&image)
    }

    /// Run the whole-image pass and every region pass, then clean.
    ///
    /// A failing whole-image pass fails the extraction. A region that is empty
    /// after clipping, or whose recognition fails, contributes nothing.
    #[instrument(skip_all, fields(
        backend = self.recognizer.name(),
        width = image.width(),
        height = image.height(),
    ))]
    pub fn extract_image(&self, image: &GrayImage) -> Result<ExtractionReport> {
        let full_text = self
            .recognizer
            .recognize(image, &self.settings.full_page_params())?;
        let region_text = self.recognize_regions(image);

        let combined = format!("{}\n{}", full_text, region_text);
        let text = self.cleaner.clean(&combined);

        let report = ExtractionReport {
            original_length: combined.chars().count(),
            cleaned_length: text.chars().count(),
            text,
        };
        info!(
            original_length = report.original_length,
            cleaned_length = report.cleaned_length,
            "Text extracted"
        );
        Ok(report)
    }

    /// Newline-joined, non-empty trimmed texts of the region passes, in table
    /// order.
    fn recognize_regions(&self, image: &GrayImage) -> String {
        let (width, height) = image.dimensions();
        let params = self.settings.region_params();

        let mut texts = Vec::with_capacity(self.regions.len());
        for region in &self.regions {
            let Some(rect) = resolve_region(region, width, height) else {
                warn!(region = %region.label, width, height, "Region is empty at this size; skipped");
                continue;
            };

            let crop = crop_region(image, rect);
            match self.recognizer.recognize(&crop, &params) {
                Ok(text) => {
                    let text = text.trim();
                    debug!(region = %region.label, char_count = text.chars().count(), "Region recognized");
                    if !text.is_empty() {
                        texts.push(text.to_string());
                    }
                }
                Err(err) => {
                    warn!(region = %region.label, error = %err, "Region recognition failed; skipped");
                }
            }
        }
        texts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use cedula_core::PageSegmentation;
    use cedula_core::RecognitionParams;
    use cedula_core::error::CedulaError;

    /// Replays scripted answers and records each call's image size and page mode.
    struct Scripted {
        answers: RefCell<Vec<Result<String>>>,
        calls: RefCell<Vec<((u32, u32), PageSegmentation)>>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<String>>) -> Self {
            Self {
                answers: RefCell::new(answers.into_iter().rev().collect()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextRecognizer for Rc<Scripted> {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn recognize(&self, image: &GrayImage, params: &RecognitionParams) -> Result<String> {
            self.calls
                .borrow_mut()
                .push((image.dimensions(), params.page_mode));
            self.answers
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn extractor(answers: Vec<Result<String>>) -> (TextExtractor, Rc<Scripted>) {
        let scripted = Rc::new(Scripted::new(answers));
        let extractor =
            TextExtractor::new(Box::new(scripted.clone()), &PipelineConfig::default()).unwrap();
        (extractor, scripted)
    }

    fn card() -> GrayImage {
        GrayImage::from_pixel(1000, 630, image::Luma([255]))
    }

    #[test]
    fn whole_image_then_each_region_in_order() {
        let (extractor, scripted) = extractor(vec![
            Ok("REPUBLICA DE COLOMBIA\nIDENTIFICACION PERSONAL".into()),
            Ok("1.041.970.336".into()),
            Ok("LUZ DEISY".into()),
            Ok("RAMOS OCHOA".into()),
            Ok("".into()),
        ]);

        let report = extractor.extract_image(&card()).unwrap();
        assert_eq!(
            report.text,
            "REPUBLICA DE COLOMBIA\nIDENTIFICACION PERSONAL\n1.041.970.336\nLUZ DEISY\nRAMOS OCHOA"
        );

        let calls = scripted.calls.borrow();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], ((1000, 630), PageSegmentation::SingleBlock));
        assert_eq!(calls[1], ((400, 94), PageSegmentation::SingleWord));
        assert_eq!(calls[4], ((800, 189), PageSegmentation::SingleWord));
    }

    #[test]
    fn lengths_count_characters() {
        let (extractor, _) = extractor(vec![Ok("CÉDULA ~~".into()), Ok(" NÚÑEZ ".into())]);
        let report = extractor.extract_image(&card()).unwrap();

        // "CÉDULA ~~" + "\n" + "NÚÑEZ"
        assert_eq!(report.original_length, 15);
        assert_eq!(report.text, "CÉDULA\nNÚÑEZ");
        assert_eq!(report.cleaned_length, 12);
    }

    #[test]
    fn region_failure_is_tolerated() {
        let (extractor, scripted) = extractor(vec![
            Ok("APELLIDOS".into()),
            Err(CedulaError::Ocr("engine hiccup".into())),
            Ok("NOMBRES".into()),
        ]);
        let report = extractor.extract_image(&card()).unwrap();
        assert_eq!(report.text, "APELLIDOS\nNOMBRES");
        assert_eq!(scripted.calls.borrow().len(), 5);
    }

    #[test]
    fn whole_image_failure_fails_extraction() {
        let (extractor, scripted) =
            extractor(vec![Err(CedulaError::Ocr("engine unavailable".into()))]);
        let err = extractor.extract_image(&card()).unwrap_err();
        assert!(err.to_string().contains("engine unavailable"));
        assert_eq!(scripted.calls.borrow().len(), 1);
    }

    #[test]
    fn tiny_image_skips_every_region() {
        let (extractor, scripted) = extractor(vec![Ok("x".into())]);
        let report = extractor.extract_image(&GrayImage::new(2, 2)).unwrap();
        assert_eq!(report.text, "");
        assert_eq!(report.cleaned_length, 0);
        assert_eq!(scripted.calls.borrow().len(), 1);
    }

    #[test]
    fn noise_lines_do_not_survive() {
        let (extractor, _) = extractor(vec![Ok(
            "Tesseract OCR 5.3\nREGISTRADURIA NACIONAL\nwww.registraduria.gov.co".into(),
        )]);
        let report = extractor.extract_image(&card()).unwrap();
        assert_eq!(report.text, "REGISTRADURIA NACIONAL");
    }

    #[test]
    fn missing_file_names_the_path() {
        let (extractor, scripted) = extractor(vec![]);
        let err = extractor
            .extract_path(Path::new("/nonexistent/cedula.jpg"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cedula.jpg"));
        assert!(scripted.calls.borrow().is_empty());
    }
}
