// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasteriser backed by PDFium (dynamically linked via `pdfium-render`).
//
// Only compiled with the `pdfium` feature. The PDFium shared library is looked
// up in the working directory first, then on the system library path.

use pdfium_render::prelude::{PdfRenderConfig, Pdfium, PdfiumError};
use trimpress_core::error::{Result, TrimpressError};
use tracing::{debug, info, instrument};

use crate::image::ImageProcessor;
use crate::image::RasterPassthrough;
use crate::traits::{PageSource, Rasterizer, RenderablePage};

/// Renders single-page PDFs to PNG with PDFium; raster pages are passed
/// through [`RasterPassthrough`].
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
    max_pixels: u64,
}

impl PdfiumRasterizer {
    /// Bind to the PDFium library.
    pub fn new(max_pixels: u64) -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(pdfium_err)?;
        info!("PDFium library bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            max_pixels,
        })
    }
}

impl Rasterizer for PdfiumRasterizer {
    #[instrument(skip(self, page), fields(page = page.index))]
    fn render_page(&self, page: &RenderablePage, dpi: u32) -> Result<Vec<u8>> {
        let bytes = match &page.source {
            PageSource::Pdf(bytes) => bytes,
            PageSource::Raster(_) => {
                return RasterPassthrough::new(self.max_pixels).render_page(page, dpi);
            }
        };

        let scale = dpi as f32 / 72.0;
        let expected = (page.width_pt * scale as f64).ceil() * (page.height_pt * scale as f64).ceil();
        if expected > self.max_pixels as f64 {
            return Err(TrimpressError::ResourceExhausted(format!(
                "page {} would rasterise to {expected:.0} px at {dpi} DPI",
                page.index + 1
            )));
        }

        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(pdfium_err)?;
        let pdf_page = document.pages().get(0).map_err(pdfium_err)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = pdf_page.render_with_config(&config).map_err(pdfium_err)?;

        // The bitmap and decoded image are dropped before this returns; only
        // the encoded PNG survives.
        let png = ImageProcessor::from_dynamic(bitmap.as_image())
            .flatten_onto_white()
            .to_png_bytes()?;
        debug!(png_bytes = png.len(), "PDF page rasterised");
        Ok(png)
    }
}

fn pdfium_err(err: PdfiumError) -> TrimpressError {
    match err {
        PdfiumError::LoadLibraryError(inner) => TrimpressError::UnsupportedSource(format!(
            "PDFium library could not be loaded: {inner}"
        )),
        other => TrimpressError::PdfError(format!("PDFium error: {other:?}")),
    }
}
