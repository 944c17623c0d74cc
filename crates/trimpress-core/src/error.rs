// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Trimpress.

use thiserror::Error;

/// Top-level error type for all Trimpress operations.
///
/// An empty extraction is deliberately absent: it is reported as
/// `ExtractionStatus::Empty` so callers can surface it as a warning.
#[derive(Debug, Error)]
pub enum TrimpressError {
    // -- Geometry --
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    // -- Sources --
    #[error("unsupported source document: {0}")]
    UnsupportedSource(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Layout state --
    #[error("layout is already populated with {0} units")]
    AlreadyPopulated(usize),

    #[error("index {index} out of range for layout of {len} units")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unit {0} is an image and has no editable text")]
    NotEditable(usize),

    // -- Export --
    #[error("nothing to export: the layout has no units")]
    EmptyDocument,

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TrimpressError>;
