// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content extractor: turns source bytes into an ordered list of units, one
// per output page.
//
// Paginated sources yield one image unit per page. Flowable sources yield one
// image unit per picture and one text unit per non-empty paragraph, in
// document order. Extraction either returns every unit or fails; a partial
// list is never handed back.

use trimpress_core::config::{ExportConfig, MAX_DPI, MIN_DPI};
use trimpress_core::error::Result;
use trimpress_core::types::{SourceKind, Unit};
use tracing::{debug, info, instrument, warn};

use crate::detect::detect_kind;
use crate::image::processor::normalize_to_png;
use crate::reader::SourceReader;
use crate::traits::{DocumentReader, FlowItem, Rasterizer};

/// Whether extraction found anything to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// This many units were produced.
    Populated(usize),
    /// The source was readable but held no content.
    Empty,
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub units: Vec<Unit>,
    pub status: ExtractionStatus,
    pub kind: SourceKind,
}

impl Extraction {
    fn new(units: Vec<Unit>, kind: SourceKind) -> Self {
        let status = if units.is_empty() {
            ExtractionStatus::Empty
        } else {
            ExtractionStatus::Populated(units.len())
        };
        Self {
            units,
            status,
            kind,
        }
    }
}

/// Normalises source documents into [`Unit`]s.
pub struct ContentExtractor {
    reader: Box<dyn DocumentReader>,
    rasterizer: Box<dyn Rasterizer>,
    dpi: u32,
    max_pixels: u64,
}

impl ContentExtractor {
    /// Build an extractor from explicit collaborators.
    ///
    /// A DPI outside the supported range is clamped with a warning.
    pub fn new(
        reader: impl DocumentReader + 'static,
        rasterizer: impl Rasterizer + 'static,
        config: &ExportConfig,
    ) -> Self {
        let dpi = config.effective_dpi();
        if dpi != config.dpi {
            warn!(
                requested = config.dpi,
                used = dpi,
                "DPI outside {MIN_DPI}-{MAX_DPI}; clamped"
            );
        }
        Self {
            reader: Box::new(reader),
            rasterizer: Box::new(rasterizer),
            dpi,
            max_pixels: config.max_page_pixels,
        }
    }

    /// The default collaborators: [`SourceReader`] plus the best rasteriser
    /// this build has.
    pub fn with_defaults(config: &ExportConfig) -> Result<Self> {
        #[cfg(feature = "pdfium")]
        let rasterizer = crate::pdf::PdfiumRasterizer::new(config.max_page_pixels)?;
        #[cfg(not(feature = "pdfium"))]
        let rasterizer = crate::image::RasterPassthrough::new(config.max_page_pixels);

        Ok(Self::new(SourceReader::new(), rasterizer, config))
    }

    /// Rasterisation DPI actually in use.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Extract units from `bytes`. `declared` is checked against the contents.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len(), dpi = self.dpi))]
    pub fn extract(&self, bytes: &[u8], declared: Option<SourceKind>) -> Result<Extraction> {
        let kind = detect_kind(bytes, declared)?;
        let units = match kind {
            SourceKind::Paginated => self.extract_paginated(bytes)?,
            SourceKind::Flowable => self.extract_flowable(bytes)?,
        };

        let extraction = Extraction::new(units, kind);
        match extraction.status {
            ExtractionStatus::Populated(count) => info!(?kind, units = count, "Extraction complete"),
            ExtractionStatus::Empty => warn!(?kind, "Source contained no content"),
        }
        Ok(extraction)
    }

    fn extract_paginated(&self, bytes: &[u8]) -> Result<Vec<Unit>> {
        let pages = self.reader.read_paginated(bytes)?;
        let mut units = Vec::with_capacity(pages.len());

        for page in pages {
            let png = self.rasterizer.render_page(&page, self.dpi)?;
            debug!(page = page.index, png_bytes = png.len(), "Page rasterised");
            units.push(Unit::Image {
                pixel_data: png,
                source_index: page.index,
            });
            // `page` (and its split-out PDF bytes) is dropped here, before the
            // next page is rendered.
        }
        Ok(units)
    }

    fn extract_flowable(&self, bytes: &[u8]) -> Result<Vec<Unit>> {
        let items = self.reader.read_flowable(bytes)?;
        let mut units = Vec::with_capacity(items.len());

        for (source_index, item) in items.into_iter().enumerate() {
            match item {
                FlowItem::Picture(encoded) => {
                    let png = normalize_to_png(&encoded, self.max_pixels)?;
                    units.push(Unit::Image {
                        pixel_data: png,
                        source_index,
                    });
                }
                FlowItem::Paragraph(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    units.push(Unit::Text {
                        content: trimmed.to_string(),
                        source_index,
                    });
                }
            }
        }
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{PageSource, RenderablePage};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;
    use trimpress_core::error::TrimpressError;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    /// Reader returning canned pages or flow items, whatever the bytes.
    struct CannedReader {
        pages: usize,
        flow: Vec<FlowItem>,
    }

    impl DocumentReader for CannedReader {
        fn read_paginated(&self, _bytes: &[u8]) -> Result<Vec<RenderablePage>> {
            Ok((0..self.pages)
                .map(|index| RenderablePage {
                    index,
                    width_pt: 100.0,
                    height_pt: 100.0,
                    source: PageSource::Pdf(vec![index as u8]),
                })
                .collect())
        }

        fn read_flowable(&self, _bytes: &[u8]) -> Result<Vec<FlowItem>> {
            Ok(self.flow.clone())
        }
    }

    /// Rasteriser that encodes the page index as the image width, and fails
    /// on a chosen page.
    struct IndexRasterizer {
        fail_on: Option<usize>,
        seen_dpi: Rc<Cell<u32>>,
    }

    impl Rasterizer for IndexRasterizer {
        fn render_page(&self, page: &RenderablePage, dpi: u32) -> Result<Vec<u8>> {
            self.seen_dpi.set(dpi);
            if self.fail_on == Some(page.index) {
                return Err(TrimpressError::ResourceExhausted("too big".into()));
            }
            Ok(png(page.index as u32 + 1, 1))
        }
    }

    fn extractor(reader: CannedReader, fail_on: Option<usize>, dpi: u32) -> (ContentExtractor, Rc<Cell<u32>>) {
        let seen_dpi = Rc::new(Cell::new(0));
        let config = ExportConfig {
            dpi,
            ..ExportConfig::default()
        };
        let rasterizer = IndexRasterizer {
            fail_on,
            seen_dpi: Rc::clone(&seen_dpi),
        };
        (ContentExtractor::new(reader, rasterizer, &config), seen_dpi)
    }

    #[test]
    fn paginated_yields_one_image_per_page_in_order() {
        let (ex, _) = extractor(CannedReader { pages: 3, flow: vec![] }, None, 150);
        let extraction = ex.extract(b"%PDF-1.7", None).unwrap();
        assert_eq!(extraction.status, ExtractionStatus::Populated(3));
        let indices: Vec<usize> = extraction.units.iter().map(Unit::source_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(extraction.units.iter().all(|u| !u.is_text()));
    }

    #[test]
    fn out_of_range_dpi_is_clamped() {
        let (ex, seen) = extractor(CannedReader { pages: 1, flow: vec![] }, None, 600);
        assert_eq!(ex.dpi(), 200);
        ex.extract(b"%PDF-1.7", None).unwrap();
        assert_eq!(seen.get(), 200);
    }

    #[test]
    fn one_failing_page_fails_the_whole_extraction() {
        let (ex, _) = extractor(CannedReader { pages: 4, flow: vec![] }, Some(2), 150);
        assert!(matches!(
            ex.extract(b"%PDF-1.7", None),
            Err(TrimpressError::ResourceExhausted(_))
        ));
    }

    #[test]
    fn flowable_keeps_document_order_and_skips_blank_paragraphs() {
        let flow = vec![
            FlowItem::Picture(png(4, 2)),
            FlowItem::Paragraph("  x  ".into()),
            FlowItem::Paragraph("   ".into()),
            FlowItem::Picture(png(2, 4)),
        ];
        let (ex, _) = extractor(CannedReader { pages: 0, flow }, None, 150);
        let extraction = ex.extract(b"plain words", None).unwrap();

        assert_eq!(extraction.status, ExtractionStatus::Populated(3));
        let units = &extraction.units;
        assert!(matches!(units[0], Unit::Image { source_index: 0, .. }));
        assert_eq!(
            units[1],
            Unit::Text {
                content: "x".into(),
                source_index: 1
            }
        );
        assert!(matches!(units[2], Unit::Image { source_index: 3, .. }));
    }

    #[test]
    fn flowable_without_content_is_empty_not_an_error() {
        let flow = vec![FlowItem::Paragraph("\n\t".into())];
        let (ex, _) = extractor(CannedReader { pages: 0, flow }, None, 150);
        let extraction = ex.extract(b"plain words", None).unwrap();
        assert_eq!(extraction.status, ExtractionStatus::Empty);
        assert!(extraction.units.is_empty());
    }

    #[test]
    fn undecodable_source_is_unsupported() {
        let (ex, _) = extractor(CannedReader { pages: 1, flow: vec![] }, None, 150);
        assert!(matches!(
            ex.extract(&[0x00, 0xFF, 0x00, 0xFE], None),
            Err(TrimpressError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn raster_source_needs_no_pdf_rasteriser() {
        let config = ExportConfig::default();
        let ex = ContentExtractor::new(
            SourceReader::new(),
            crate::image::RasterPassthrough::new(config.max_page_pixels),
            &config,
        );
        let extraction = ex.extract(&png(12, 8), None).unwrap();
        assert_eq!(extraction.kind, SourceKind::Paginated);
        assert_eq!(extraction.status, ExtractionStatus::Populated(1));
    }
}
