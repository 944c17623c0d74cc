// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: build print-ready PDF documents page by page using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Pages are accumulated here until `serialize`.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use trimpress_core::error::{Result, TrimpressError};
use trimpress_core::types::{Rect, TextFont};
use tracing::{debug, info, instrument};

use crate::compose::policy::fit_centered;
use crate::image::processor::ImageProcessor;
use crate::traits::{OutputWriter, PageHandle};

/// At this DPI one image pixel maps to one PDF point before scaling.
const UNIT_DPI: f32 = 72.0;
const MM_PER_PT: f64 = 25.4 / 72.0;

/// Descender depth as a fraction of the font size.
const DESCENT_EM: f64 = 0.2;

struct PendingPage {
    width_pt: f64,
    height_pt: f64,
    ops: Vec<Op>,
}

/// [`OutputWriter`] producing PDF bytes with `printpdf`.
pub struct PdfOutputWriter {
    document: PdfDocument,
    title: String,
    pages: Vec<PendingPage>,
    /// Largest image (width × height) accepted for placement.
    max_pixels: u64,
}

impl PdfOutputWriter {
    /// Create a writer that refuses images above `max_pixels`.
    pub fn new(max_pixels: u64) -> Self {
        let title = String::from("Trimpress Manuscript");
        Self {
            document: PdfDocument::new(&title),
            title,
            pages: Vec::new(),
            max_pixels,
        }
    }

    /// Number of pages created since the last `new_document`/`serialize`.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_mut(&mut self, page: PageHandle) -> Result<&mut PendingPage> {
        let count = self.pages.len();
        self.pages.get_mut(page.0).ok_or_else(|| {
            TrimpressError::PdfError(format!(
                "page handle {} is not valid ({} pages open)",
                page.0, count
            ))
        })
    }
}

impl OutputWriter for PdfOutputWriter {
    fn new_document(&mut self, title: &str) {
        self.title = title.to_string();
        self.document = PdfDocument::new(title);
        self.pages.clear();
    }

    fn new_page(&mut self, width_pt: f64, height_pt: f64) -> Result<PageHandle> {
        if !(width_pt > 0.0 && height_pt > 0.0) {
            return Err(TrimpressError::InvalidGeometry(format!(
                "page size {width_pt} x {height_pt} pt"
            )));
        }
        self.pages.push(PendingPage {
            width_pt,
            height_pt,
            ops: Vec::new(),
        });
        Ok(PageHandle(self.pages.len() - 1))
    }

    #[instrument(skip(self, image), fields(page = page.0, bytes_len = image.len()))]
    fn place_image(
        &mut self,
        page: PageHandle,
        image: Vec<u8>,
        rect: Rect,
        stretch: bool,
    ) -> Result<()> {
        // Validate the handle before spending time on decoding.
        self.page_mut(page)?;

        let (pixels, img_width, img_height) =
            ImageProcessor::from_bytes_bounded(&image, self.max_pixels)?
                .flatten_onto_white()
                .into_rgb8();
        drop(image);

        let raw = RawImage {
            pixels: RawImageData::U8(pixels),
            width: img_width as usize,
            height: img_height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = self.document.add_image(&raw);
        drop(raw);

        let target = if stretch {
            rect
        } else {
            fit_centered(img_width as f64, img_height as f64, &rect)
        };
        let scale_x = (target.width() / img_width as f64) as f32;
        let scale_y = (target.height() / img_height as f64) as f32;

        self.page_mut(page)?.ops.push(Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(target.x0 as f32)),
                translate_y: Some(Pt(target.y0 as f32)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(UNIT_DPI),
                rotate: None,
            },
        });

        debug!(scale_x, scale_y, stretch, "Image placed on page");
        Ok(())
    }

    fn place_text(
        &mut self,
        page: PageHandle,
        text: &str,
        rect: Rect,
        font: TextFont,
        size_pt: f64,
    ) -> Result<()> {
        let baseline = rect.y0 + DESCENT_EM * size_pt;
        let ops = &mut self.page_mut(page)?.ops;

        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(rect.x0 as f32),
                y: Pt(baseline as f32),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(size_pt as f32),
            font: builtin_font(font),
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font: builtin_font(font),
        });
        ops.push(Op::EndTextSection);
        Ok(())
    }

    #[instrument(skip(self), fields(pages = self.pages.len(), title = %self.title))]
    fn serialize(&mut self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(TrimpressError::EmptyDocument);
        }

        let pages: Vec<PdfPage> = self
            .pages
            .drain(..)
            .map(|page| {
                PdfPage::new(
                    Mm((page.width_pt * MM_PER_PT) as f32),
                    Mm((page.height_pt * MM_PER_PT) as f32),
                    page.ops,
                )
            })
            .collect();

        let mut document = std::mem::replace(&mut self.document, PdfDocument::new(&self.title));
        document.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = document.save(&PdfSaveOptions::default(), &mut warnings);

        info!(
            output_bytes = output.len(),
            warnings = warnings.len(),
            "PDF serialised"
        );
        Ok(output)
    }
}

fn builtin_font(font: TextFont) -> BuiltinFont {
    match font {
        TextFont::Helvetica => BuiltinFont::Helvetica,
        TextFont::HelveticaBold => BuiltinFont::HelveticaBold,
        TextFont::TimesRoman => BuiltinFont::TimesRoman,
        TextFont::Courier => BuiltinFont::Courier,
    }
}
