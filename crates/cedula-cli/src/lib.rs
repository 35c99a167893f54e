// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cedula-cli: shared plumbing for the `cedula-normalize` and `cedula-extract`
// binaries.
//
// Each binary takes one image path, runs its pipeline, and prints exactly one
// JSON result record on stdout. Logs go to stderr.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use cedula_core::error::Result;
use cedula_core::{ExtractionReport, NormalizeReport, PipelineConfig, ResultRecord};
use cedula_document::{ImageProcessor, TextExtractor, build_recognizer, normalize};
use serde::Serialize;
use tracing::{error, info, warn};

/// Install the stderr `tracing` subscriber (`RUST_LOG`, default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// The image path: the first command-line argument, if any.
pub fn first_arg() -> Option<String> {
    std::env::args().nth(1)
}

/// Run `job`, turning its error or any panic into the failure record.
pub fn guarded<T, F>(job: F) -> ResultRecord<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(payload)) => ResultRecord::success(payload),
        Ok(Err(err)) => {
            warn!(kind = ?err.kind(), error = %err, "Pipeline failed");
            ResultRecord::from_result(Err(err))
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected internal failure".to_string());
            error!(%message, "Pipeline panicked");
            ResultRecord::failure(message)
        }
    }
}

/// Write `record` as a single JSON line on stdout.
pub fn print_record<T: Serialize>(record: &ResultRecord<T>) {
    let line = serde_json::to_string(record).unwrap_or_else(|err| {
        serde_json::json!({ "error": format!("cannot serialize result: {}", err) }).to_string()
    });
    let mut stdout = std::io::stdout().lock();
    if let Err(err) = writeln!(stdout, "{}", line).and_then(|()| stdout.flush()) {
        error!(error = %err, "Failed to write result record");
    }
}

/// Normalize the photograph at `path` with the configured settings.
pub fn run_normalize(path: &Path) -> Result<NormalizeReport> {
    let config = PipelineConfig::from_env()?;
    normalize(path, &config.normalizer)
}

/// Extract and clean the text of the image at `path`.
///
/// The image is decoded before the OCR backend is built, so an unreadable
/// path is reported as such even when no backend is available.
pub fn run_extract(path: &Path) -> Result<ExtractionReport> {
    let config = PipelineConfig::from_env()?;
    let image = ImageProcessor::open(path)?.grayscale().into_luma8();

    let recognizer = build_recognizer(&config.extractor)?;
    info!(backend = recognizer.name(), "OCR backend ready");

    let extractor = TextExtractor::new(recognizer, &config)?;
    extractor.extract_image(&image)
}
