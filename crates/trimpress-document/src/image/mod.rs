// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: bounded decoding and PNG normalisation of page rasters and
// embedded pictures, plus the passthrough rasteriser for image sources.

pub mod processor;
pub mod raster;

pub use processor::ImageProcessor;
pub use raster::RasterPassthrough;
