// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source format detection from magic bytes.

use std::io::Cursor;

use trimpress_core::error::{Result, TrimpressError};
use trimpress_core::types::SourceKind;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Entry that marks a ZIP container as a Word document.
pub(crate) const DOCX_MAIN_PART: &str = "word/document.xml";

/// Concrete container format of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Raster,
    Docx,
    PlainText,
}

impl SourceFormat {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Pdf | Self::Raster => SourceKind::Paginated,
            Self::Docx | Self::PlainText => SourceKind::Flowable,
        }
    }
}

/// Work out what a byte buffer contains.
///
/// Fails with `UnsupportedSource` for empty input, ZIP archives that are not
/// Word documents, and binary data that is neither PDF nor a known raster.
pub fn detect_format(bytes: &[u8]) -> Result<SourceFormat> {
    if bytes.is_empty() {
        return Err(TrimpressError::UnsupportedSource("file is empty".into()));
    }

    // PDF headers may be preceded by binary junk; readers accept it within
    // 1 KiB. Text before the marker is a manuscript that merely mentions it.
    let head = &bytes[..bytes.len().min(1024)];
    if let Some(at) = head.windows(PDF_MAGIC.len()).position(|window| window == PDF_MAGIC) {
        if at == 0 || !is_text(&bytes[..at]) {
            return Ok(SourceFormat::Pdf);
        }
    }

    if bytes.starts_with(ZIP_MAGIC) {
        return if is_docx(bytes) {
            Ok(SourceFormat::Docx)
        } else {
            Err(TrimpressError::UnsupportedSource(
                "ZIP archive is not a Word document".into(),
            ))
        };
    }

    if image::guess_format(bytes).is_ok() {
        return Ok(SourceFormat::Raster);
    }

    if is_text(bytes) {
        return Ok(SourceFormat::PlainText);
    }

    Err(TrimpressError::UnsupportedSource(
        "unrecognised document format".into(),
    ))
}

/// Detect the source kind, honouring a caller-declared kind when the bytes agree.
///
/// A declaration that contradicts the bytes is rejected rather than trusted.
pub fn detect_kind(bytes: &[u8], declared: Option<SourceKind>) -> Result<SourceKind> {
    let detected = detect_format(bytes)?.kind();
    match declared {
        Some(kind) if kind != detected => Err(TrimpressError::UnsupportedSource(format!(
            "declared {kind:?} but contents look {detected:?}"
        ))),
        _ => Ok(detected),
    }
}

/// UTF-8 without NUL bytes, ignoring a leading byte-order mark.
fn is_text(bytes: &[u8]) -> bool {
    let text = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(text).is_ok() && !text.contains(&0)
}

fn is_docx(bytes: &[u8]) -> bool {
    match zip::ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive.file_names().any(|name| name == DOCX_MAIN_PART),
        Err(_) => false,
    }
}
