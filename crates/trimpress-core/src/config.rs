// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrimpressError};
use crate::types::{PlacementPolicy, TextFont, TrimSize};

/// Lowest rasterisation DPI accepted for paginated sources.
pub const MIN_DPI: u32 = 150;
/// Highest rasterisation DPI accepted for paginated sources.
pub const MAX_DPI: u32 = 200;

/// Settings for one extract-and-export pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Nominal trim size of the printed book.
    pub trim: TrimSize,
    /// Add the platform bleed to every page.
    pub bleed: bool,
    /// How image units are placed on their page.
    pub policy: PlacementPolicy,
    /// Rasterisation resolution for paginated sources (150–200).
    pub dpi: u32,
    /// Font for text units.
    pub font: TextFont,
    /// Starting font size for text units, in points.
    pub font_size: f32,
    /// Text is shrunk no further than this before lines are truncated.
    pub min_font_size: f32,
    /// Largest raster (width × height) accepted for a single page.
    pub max_page_pixels: u64,
    /// Title written into the output PDF metadata.
    pub title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            trim: TrimSize::default(),
            bleed: true,
            policy: PlacementPolicy::default(),
            dpi: MIN_DPI,
            font: TextFont::default(),
            font_size: 14.0,
            min_font_size: 8.0,
            // 8.5 x 11 in at 200 DPI is ~3.7 MP; leave generous headroom.
            max_page_pixels: 40_000_000,
            title: "Trimpress Manuscript".into(),
        }
    }
}

impl ExportConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a sensible export.
    pub fn validate(&self) -> Result<()> {
        if !(self.font_size > 0.0 && self.min_font_size > 0.0) {
            return Err(TrimpressError::Config(
                "font sizes must be positive".into(),
            ));
        }
        if self.min_font_size > self.font_size {
            return Err(TrimpressError::Config(format!(
                "min_font_size {} exceeds font_size {}",
                self.min_font_size, self.font_size
            )));
        }
        if self.max_page_pixels == 0 {
            return Err(TrimpressError::Config(
                "max_page_pixels must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// The configured DPI clamped to the supported range.
    pub fn effective_dpi(&self) -> u32 {
        self.dpi.clamp(MIN_DPI, MAX_DPI)
    }
}
