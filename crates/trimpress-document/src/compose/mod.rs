// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor: one output page per unit, in order, at the bleed-inclusive
// page size.
//
// Image units follow the configured `PlacementPolicy`; text units are always
// centred inside the safe zone. Any failure aborts the whole export and no
// `OutputDocument` is produced.

pub mod policy;
pub mod text;

use serde::Serialize;
use trimpress_core::error::{Result, TrimpressError};
use trimpress_core::geometry::{BleedSpec, safe_rect};
use trimpress_core::types::{PlacementPolicy, Rect, Unit};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::image_dimensions;
use crate::traits::OutputWriter;

pub use policy::{fit_centered, image_placement};
pub use text::{TextBlock, TextLine, TextStyle, layout_text};

/// What ended up on one output page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placed {
    Image {
        /// Rectangle the image covers, in points.
        rect: Rect,
        stretched: bool,
        pixel_width: u32,
        pixel_height: u32,
    },
    Text {
        lines: Vec<String>,
        font_size: f64,
        rect: Rect,
    },
}

/// Placement record for one output page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlacement {
    /// Zero-based output page number.
    pub page: usize,
    pub source_index: usize,
    pub width_pt: f64,
    pub height_pt: f64,
    pub placed: Placed,
}

/// Something the compositor had to give up to produce a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Text did not fit at the minimum font size; trailing lines were cut.
    TextTruncated {
        page: usize,
        source_index: usize,
        dropped_lines: usize,
        font_size: f64,
    },
}

impl Degradation {
    pub fn page(&self) -> usize {
        match self {
            Self::TextTruncated { page, .. } => *page,
        }
    }
}

/// A finished, serialised output document.
#[derive(Clone, PartialEq, Serialize)]
pub struct OutputDocument {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub policy: PlacementPolicy,
    pub pages: Vec<PagePlacement>,
    pub degradations: Vec<Degradation>,
}

impl OutputDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

impl std::fmt::Debug for OutputDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDocument")
            .field("bytes", &self.bytes.len())
            .field("policy", &self.policy)
            .field("pages", &self.pages.len())
            .field("degradations", &self.degradations)
            .finish()
    }
}

/// Assembles units into a print-ready document through an [`OutputWriter`].
#[derive(Debug, Clone)]
pub struct Compositor {
    style: TextStyle,
    title: String,
}

impl Compositor {
    pub fn new(style: TextStyle, title: impl Into<String>) -> Self {
        Self {
            style,
            title: title.into(),
        }
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Compose `units` (consumed, so each raster is released once handed to
    /// the writer) into a document of `spec`-sized pages.
    #[instrument(skip(self, units, writer), fields(units = units.len(), %policy))]
    pub fn compose(
        &self,
        units: Vec<Unit>,
        spec: &BleedSpec,
        policy: PlacementPolicy,
        writer: &mut dyn OutputWriter,
    ) -> Result<OutputDocument> {
        if units.is_empty() {
            return Err(TrimpressError::EmptyDocument);
        }

        let (width_pt, height_pt) = spec.output_size_pt();
        let safe = safe_rect(spec).to_points();
        let mut pages = Vec::with_capacity(units.len());
        let mut degradations = Vec::new();

        writer.new_document(&self.title);
        for (page, unit) in units.into_iter().enumerate() {
            let handle = writer.new_page(width_pt, height_pt)?;
            let source_index = unit.source_index();

            let placed = match unit {
                Unit::Image { pixel_data, .. } => {
                    let (pixel_width, pixel_height) = image_dimensions(&pixel_data)?;
                    if pixel_width == 0 || pixel_height == 0 {
                        return Err(TrimpressError::ImageError(format!(
                            "page {} image has no pixels",
                            page + 1
                        )));
                    }
                    let (rect, stretched) =
                        image_placement(policy, spec, pixel_width, pixel_height);
                    writer.place_image(handle, pixel_data, rect, stretched)?;
                    Placed::Image {
                        rect,
                        stretched,
                        pixel_width,
                        pixel_height,
                    }
                }
                Unit::Text { content, .. } => {
                    let block = layout_text(&content, &safe, &self.style);
                    for line in &block.lines {
                        writer.place_text(
                            handle,
                            &line.text,
                            line.rect,
                            self.style.font,
                            block.font_size,
                        )?;
                    }
                    if block.is_truncated() {
                        warn!(
                            page,
                            dropped_lines = block.dropped_lines,
                            "Text did not fit the safe zone; truncated"
                        );
                        degradations.push(Degradation::TextTruncated {
                            page,
                            source_index,
                            dropped_lines: block.dropped_lines,
                            font_size: block.font_size,
                        });
                    }
                    Placed::Text {
                        font_size: block.font_size,
                        rect: block.rect,
                        lines: block.lines.into_iter().map(|line| line.text).collect(),
                    }
                }
            };

            debug!(page, source_index, "Unit placed");
            pages.push(PagePlacement {
                page,
                source_index,
                width_pt,
                height_pt,
                placed,
            });
        }

        let bytes = writer.serialize()?;
        info!(
            pages = pages.len(),
            degraded = degradations.len(),
            output_bytes = bytes.len(),
            "Document composed"
        );

        Ok(OutputDocument {
            bytes,
            policy,
            pages,
            degradations,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::traits::PageHandle;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use trimpress_core::geometry::compute_bleed_spec;
    use trimpress_core::types::{TextFont, TrimSize};

    /// Records every call instead of producing a PDF.
    #[derive(Default)]
    pub(crate) struct RecordingWriter {
        pub pages: Vec<(f64, f64)>,
        pub images: Vec<(usize, Rect, bool)>,
        pub texts: Vec<(usize, String, f64)>,
        pub fail_on_image: bool,
    }

    impl OutputWriter for RecordingWriter {
        fn new_document(&mut self, _title: &str) {
            self.pages.clear();
            self.images.clear();
            self.texts.clear();
        }

        fn new_page(&mut self, width_pt: f64, height_pt: f64) -> Result<PageHandle> {
            self.pages.push((width_pt, height_pt));
            Ok(PageHandle(self.pages.len() - 1))
        }

        fn place_image(&mut self, page: PageHandle, _image: Vec<u8>, rect: Rect, stretch: bool) -> Result<()> {
            if self.fail_on_image {
                return Err(TrimpressError::ResourceExhausted("no room".into()));
            }
            self.images.push((page.0, rect, stretch));
            Ok(())
        }

        fn place_text(&mut self, page: PageHandle, text: &str, _rect: Rect, _font: TextFont, size_pt: f64) -> Result<()> {
            self.texts.push((page.0, text.to_string(), size_pt));
            Ok(())
        }

        fn serialize(&mut self) -> Result<Vec<u8>> {
            Ok(format!("{} pages", self.pages.len()).into_bytes())
        }
    }

    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn image(width: u32, height: u32, source_index: usize) -> Unit {
        Unit::Image {
            pixel_data: png(width, height),
            source_index,
        }
    }

    fn spec() -> BleedSpec {
        compute_bleed_spec(TrimSize::new(8.5, 8.5), true).unwrap()
    }

    fn compositor() -> Compositor {
        Compositor::new(TextStyle::default(), "test")
    }

    #[test]
    fn one_page_per_unit_at_output_size() {
        let units = vec![
            image(40, 30, 0),
            Unit::Text {
                content: "x".into(),
                source_index: 1,
            },
            image(30, 40, 2),
        ];
        let mut writer = RecordingWriter::default();
        let doc = compositor()
            .compose(units, &spec(), PlacementPolicy::ShrinkToSafeZone, &mut writer)
            .unwrap();

        assert_eq!(doc.page_count(), 3);
        assert_eq!(writer.pages, vec![(621.0, 630.0); 3]);
        let order: Vec<usize> = doc.pages.iter().map(|p| p.source_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(writer.texts, vec![(1, "x".to_string(), 14.0)]);
        assert!(!doc.is_degraded());
    }

    #[test]
    fn fill_to_bleed_stretches_to_the_page() {
        let mut writer = RecordingWriter::default();
        compositor()
            .compose(vec![image(10, 500, 0)], &spec(), PlacementPolicy::FillToBleed, &mut writer)
            .unwrap();
        assert_eq!(writer.images, vec![(0, Rect::new(0.0, 0.0, 621.0, 630.0), true)]);
    }

    #[test]
    fn shrink_to_safe_zone_stays_inside() {
        let mut writer = RecordingWriter::default();
        let doc = compositor()
            .compose(vec![image(2000, 100, 0)], &spec(), PlacementPolicy::ShrinkToSafeZone, &mut writer)
            .unwrap();
        let safe = safe_rect(&spec()).to_points();
        let Placed::Image { rect, stretched, .. } = &doc.pages[0].placed else {
            panic!("expected an image placement");
        };
        assert!(!stretched);
        assert!(safe.contains(rect));
        assert!((rect.width() - safe.width()).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_empty_document() {
        let mut writer = RecordingWriter::default();
        assert!(matches!(
            compositor().compose(Vec::new(), &spec(), PlacementPolicy::FillToBleed, &mut writer),
            Err(TrimpressError::EmptyDocument)
        ));
    }

    #[test]
    fn writer_failure_aborts_the_export() {
        let mut writer = RecordingWriter {
            fail_on_image: true,
            ..RecordingWriter::default()
        };
        assert!(matches!(
            compositor().compose(vec![image(4, 4, 0)], &spec(), PlacementPolicy::FillToBleed, &mut writer),
            Err(TrimpressError::ResourceExhausted(_))
        ));
    }

    #[test]
    fn truncated_text_is_reported() {
        let wall = "All work and no play makes a dull book. ".repeat(400);
        let mut writer = RecordingWriter::default();
        let doc = compositor()
            .compose(
                vec![Unit::Text {
                    content: wall,
                    source_index: 5,
                }],
                &spec(),
                PlacementPolicy::ShrinkToSafeZone,
                &mut writer,
            )
            .unwrap();
        assert!(doc.is_degraded());
        assert!(matches!(
            doc.degradations[0],
            Degradation::TextTruncated { page: 0, source_index: 5, font_size, .. } if font_size == 8.0
        ));
    }

    #[test]
    fn identical_inputs_give_identical_geometry() {
        let run = || {
            let mut writer = RecordingWriter::default();
            compositor()
                .compose(
                    vec![image(33, 77, 0), Unit::Text { content: "same".into(), source_index: 1 }],
                    &spec(),
                    PlacementPolicy::ShrinkToSafeZone,
                    &mut writer,
                )
                .unwrap()
                .pages
        };
        assert_eq!(run(), run());
    }
}
