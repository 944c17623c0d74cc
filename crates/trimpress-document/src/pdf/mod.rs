// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: splitting source PDFs into pages, rasterising them, and
// writing print-ready output.

pub mod reader;
pub mod writer;

#[cfg(feature = "pdfium")]
pub mod raster;

pub use reader::PdfReader;
pub use writer::PdfOutputWriter;

#[cfg(feature = "pdfium")]
pub use raster::PdfiumRasterizer;
