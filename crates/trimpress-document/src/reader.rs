// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default DocumentReader: dispatches on the detected container format.

use trimpress_core::error::{Result, TrimpressError};
use tracing::{debug, instrument};

use crate::detect::{SourceFormat, detect_format};
use crate::flow::{read_docx, read_plain_text};
use crate::image::processor::image_dimensions;
use crate::pdf::PdfReader;
use crate::traits::{DocumentReader, FlowItem, PageSource, RenderablePage};

/// Reads PDFs, rasters, DOCX and plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceReader;

impl SourceReader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentReader for SourceReader {
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn read_paginated(&self, bytes: &[u8]) -> Result<Vec<RenderablePage>> {
        match detect_format(bytes)? {
            SourceFormat::Pdf => PdfReader::from_bytes(bytes)?.split_pages(),
            SourceFormat::Raster => {
                // A lone image is a one-page document, one point per pixel.
                let (width, height) = image_dimensions(bytes).map_err(|err| match err {
                    TrimpressError::ImageError(detail) => TrimpressError::UnsupportedSource(detail),
                    other => other,
                })?;
                debug!(width, height, "Raster source read as a single page");
                Ok(vec![RenderablePage {
                    index: 0,
                    width_pt: width as f64,
                    height_pt: height as f64,
                    source: PageSource::Raster(bytes.to_vec()),
                }])
            }
            other => Err(TrimpressError::UnsupportedSource(format!(
                "{other:?} is not a paginated format"
            ))),
        }
    }

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn read_flowable(&self, bytes: &[u8]) -> Result<Vec<FlowItem>> {
        match detect_format(bytes)? {
            SourceFormat::Docx => read_docx(bytes),
            SourceFormat::PlainText => read_plain_text(bytes),
            other => Err(TrimpressError::UnsupportedSource(format!(
                "{other:?} is not a flowable format"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_not_paginated() {
        assert!(matches!(
            SourceReader::new().read_paginated(b"hello"),
            Err(TrimpressError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn pdf_is_not_flowable() {
        assert!(matches!(
            SourceReader::new().read_flowable(b"%PDF-1.7\n"),
            Err(TrimpressError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn damaged_pdf_is_unsupported() {
        let err = SourceReader::new()
            .read_paginated(b"%PDF-1.7\nthis is not really a pdf")
            .unwrap_err();
        assert!(matches!(err, TrimpressError::UnsupportedSource(_)), "{err:?}");
    }

    #[test]
    fn truncated_png_is_unsupported() {
        // A PNG signature with a cut-off header chunk.
        let err = SourceReader::new()
            .read_paginated(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0")
            .unwrap_err();
        assert!(matches!(err, TrimpressError::UnsupportedSource(_)), "{err:?}");
    }

    #[test]
    fn text_reads_as_paragraphs() {
        let items = SourceReader::new()
            .read_flowable(b"first\n\nsecond")
            .unwrap();
        assert_eq!(
            items,
            vec![
                FlowItem::Paragraph("first".into()),
                FlowItem::Paragraph("second".into()),
            ]
        );
    }
}
