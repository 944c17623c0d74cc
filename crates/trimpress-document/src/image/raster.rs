// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasteriser for sources that already are rasters.

use trimpress_core::error::{Result, TrimpressError};
use tracing::{debug, instrument};

use crate::image::processor::normalize_to_png;
use crate::traits::{PageSource, Rasterizer, RenderablePage};

/// Re-encodes raster pages as PNG; refuses PDF pages.
///
/// This is the rasteriser available without native PDF rendering. Build with
/// the `pdfium` feature for `PdfiumRasterizer`, which handles both.
#[derive(Debug, Clone, Copy)]
pub struct RasterPassthrough {
    max_pixels: u64,
}

impl RasterPassthrough {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }
}

impl Rasterizer for RasterPassthrough {
    #[instrument(skip(self, page), fields(page = page.index))]
    fn render_page(&self, page: &RenderablePage, _dpi: u32) -> Result<Vec<u8>> {
        match &page.source {
            PageSource::Raster(bytes) => {
                let png = normalize_to_png(bytes, self.max_pixels)?;
                debug!(png_bytes = png.len(), "Raster page normalised");
                Ok(png)
            }
            PageSource::Pdf(_) => Err(TrimpressError::UnsupportedSource(
                "PDF pages need a PDF rasteriser (enable the `pdfium` feature)".into(),
            )),
        }
    }
}
