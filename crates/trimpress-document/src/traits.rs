// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator seams between the compositing engine and the libraries that
// read, rasterise, and write documents.
//
// The engine only ever talks to these traits. Concrete implementations live
// in `reader`, `image`, and `pdf`; tests substitute their own.

use trimpress_core::error::Result;
use trimpress_core::types::{Rect, TextFont};

/// Where the bytes of one renderable page come from.
#[derive(Clone, PartialEq, Eq)]
pub enum PageSource {
    /// A standalone single-page PDF split out of the source document.
    Pdf(Vec<u8>),
    /// An encoded raster image that already is the page.
    Raster(Vec<u8>),
}

impl std::fmt::Debug for PageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf(bytes) => write!(f, "Pdf({} bytes)", bytes.len()),
            Self::Raster(bytes) => write!(f, "Raster({} bytes)", bytes.len()),
        }
    }
}

/// One page of a paginated source, ready to be rasterised.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderablePage {
    /// Zero-based position in the source document.
    pub index: usize,
    /// Page width in points (for rasters, one point per pixel).
    pub width_pt: f64,
    /// Page height in points.
    pub height_pt: f64,
    pub source: PageSource,
}

/// One item of flowable content, in document order.
#[derive(Clone, PartialEq, Eq)]
pub enum FlowItem {
    /// Encoded bytes of an embedded picture.
    Picture(Vec<u8>),
    /// Text of one paragraph, as written.
    Paragraph(String),
}

impl std::fmt::Debug for FlowItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Picture(bytes) => write!(f, "Picture({} bytes)", bytes.len()),
            Self::Paragraph(text) => f.debug_tuple("Paragraph").field(text).finish(),
        }
    }
}

/// Reads a source document into one of the two shapes the engine consumes.
pub trait DocumentReader {
    /// Split a fixed-layout source into its pages.
    fn read_paginated(&self, bytes: &[u8]) -> Result<Vec<RenderablePage>>;

    /// Walk a flowable source in document order.
    fn read_flowable(&self, bytes: &[u8]) -> Result<Vec<FlowItem>>;
}

/// Renders a page to an encoded raster.
pub trait Rasterizer {
    /// Render `page` at `dpi` and return PNG bytes.
    ///
    /// Implementations must not hold on to the decoded bitmap after returning.
    fn render_page(&self, page: &RenderablePage, dpi: u32) -> Result<Vec<u8>>;
}

/// Opaque reference to a page created by an [`OutputWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(pub usize);

/// Builds an output document page by page.
///
/// All rectangles are in PDF points with a bottom-left origin.
pub trait OutputWriter {
    /// Discard any pages in progress and start a new document.
    fn new_document(&mut self, title: &str);

    /// Append a blank page of the given size.
    fn new_page(&mut self, width_pt: f64, height_pt: f64) -> Result<PageHandle>;

    /// Place an encoded image so that it covers `rect`.
    ///
    /// With `stretch` false the image keeps its aspect ratio and is centred
    /// inside `rect`. The writer takes ownership of the bytes and releases
    /// them once embedded.
    fn place_image(
        &mut self,
        page: PageHandle,
        image: Vec<u8>,
        rect: Rect,
        stretch: bool,
    ) -> Result<()>;

    /// Draw a single line of text with its baseline box at `rect`.
    fn place_text(
        &mut self,
        page: PageHandle,
        text: &str,
        rect: Rect,
        font: TextFont,
        size_pt: f64,
    ) -> Result<()>;

    /// Serialise the finished document and reset the writer.
    fn serialize(&mut self) -> Result<Vec<u8>>;
}
