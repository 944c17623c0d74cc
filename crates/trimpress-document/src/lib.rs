// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// trimpress-document: content extraction, layout state, and print-ready PDF
// composition for Trimpress.
//
// Source bytes go through the `ContentExtractor` into a `LayoutState` held
// by a `Session`; the `Compositor` turns a snapshot of that state into an
// `OutputDocument` via an `OutputWriter`.

pub mod compose;
pub mod detect;
pub mod extract;
pub mod flow;
pub mod image;
pub mod layout;
pub mod pdf;
pub mod reader;
pub mod session;
pub mod traits;

pub use compose::{Compositor, Degradation, OutputDocument, PagePlacement, Placed, TextStyle};
pub use detect::{SourceFormat, detect_format, detect_kind};
pub use extract::{ContentExtractor, Extraction, ExtractionStatus};
pub use image::processor::ImageProcessor;
pub use layout::LayoutState;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfOutputWriter;
pub use reader::SourceReader;
pub use session::{Gesture, Session};
pub use traits::{
    DocumentReader, FlowItem, OutputWriter, PageHandle, PageSource, Rasterizer, RenderablePage,
};

#[cfg(feature = "pdfium")]
pub use pdf::raster::PdfiumRasterizer;
