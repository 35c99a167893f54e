// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Cedula OCR.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all normalization and extraction operations.
#[derive(Debug, Error)]
pub enum CedulaError {
    // -- Input errors --
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("could not decode image {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    // -- Pipeline errors --
    #[error("image processing failed: {0}")]
    Processing(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`CedulaError`], for callers that present
/// input problems differently from pipeline faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The file is missing or is not a decodable image. Never retried.
    Input,
    /// A transform, OCR, encoding or configuration fault.
    Processing,
}

impl CedulaError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::FileNotFound(_) | Self::Decode { .. } => FailureKind::Input,
            _ => FailureKind::Processing,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CedulaError>;
