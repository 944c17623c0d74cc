// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Trimpress compositor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrimpressError;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Nominal trim size of the finished book, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimSize {
    pub width_in: f64,
    pub height_in: f64,
}

/// Standard trim sizes offered by the print-on-demand platform.
const CATALOG: &[(&str, TrimSize)] = &[
    ("8.5 x 8.5 (Square)", TrimSize::new(8.5, 8.5)),
    ("8 x 10 (Classic Picture Book)", TrimSize::new(8.0, 10.0)),
    ("6 x 9 (Standard Novel)", TrimSize::new(6.0, 9.0)),
    ("8.5 x 11 (Max Size)", TrimSize::new(8.5, 11.0)),
    ("5 x 8 (Pocket)", TrimSize::new(5.0, 8.0)),
    ("5.5 x 8.5 (Digest)", TrimSize::new(5.5, 8.5)),
    ("7 x 10 (Workbook)", TrimSize::new(7.0, 10.0)),
];

impl TrimSize {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }

    /// The built-in catalog as `(label, size)` pairs.
    pub fn catalog() -> &'static [(&'static str, TrimSize)] {
        CATALOG
    }

    /// Look up a catalog entry by its label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        CATALOG
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, size)| *size)
    }
}

impl Default for TrimSize {
    fn default() -> Self {
        Self::new(8.5, 8.5)
    }
}

impl fmt::Display for TrimSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} in", self.width_in, self.height_in)
    }
}

/// Accepts either a catalog label or a `WxH` pair such as `6x9` or `8.5 X 11`.
impl FromStr for TrimSize {
    type Err = TrimpressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(size) = Self::from_label(s) {
            return Ok(size);
        }

        let lowered = s.trim().to_ascii_lowercase();
        let (w, h) = lowered.split_once('x').ok_or_else(|| {
            TrimpressError::InvalidGeometry(format!("unrecognised trim size {s:?}"))
        })?;
        let parse = |part: &str| {
            part.trim().parse::<f64>().map_err(|err| {
                TrimpressError::InvalidGeometry(format!("bad trim dimension {part:?}: {err}"))
            })
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

/// Axis-aligned rectangle with a bottom-left origin, as PDF user space uses.
///
/// Units are whatever the caller works in; geometry functions produce inches
/// and [`Rect::to_points`] converts for the writer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Multiply every coordinate by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.x0 * factor,
            self.y0 * factor,
            self.x1 * factor,
            self.y1 * factor,
        )
    }

    /// Convert an inch rectangle to PDF points.
    pub fn to_points(&self) -> Self {
        self.scale(POINTS_PER_INCH)
    }

    /// Whether `other` lies entirely within `self` (edges included).
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        other.x0 >= self.x0 - EPS
            && other.y0 >= self.y0 - EPS
            && other.x1 <= self.x1 + EPS
            && other.y1 <= self.y1 + EPS
    }
}

/// One physical page's worth of normalized content.
#[derive(Clone, PartialEq, Eq)]
pub enum Unit {
    /// Encoded raster (PNG) destined for one page.
    Image {
        pixel_data: Vec<u8>,
        source_index: usize,
    },
    /// A block of text destined for one page.
    Text { content: String, source_index: usize },
}

impl Unit {
    /// Provenance position in the source; diagnostics only.
    pub fn source_index(&self) -> usize {
        match self {
            Self::Image { source_index, .. } | Self::Text { source_index, .. } => *source_index,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Image { .. } => UnitKind::Image,
            Self::Text { .. } => UnitKind::Text,
        }
    }
}

// Raster payloads can be megabytes; print their size rather than the bytes.
impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image {
                pixel_data,
                source_index,
            } => f
                .debug_struct("Image")
                .field("bytes", &pixel_data.len())
                .field("source_index", source_index)
                .finish(),
            Self::Text {
                content,
                source_index,
            } => f
                .debug_struct("Text")
                .field("content", content)
                .field("source_index", source_index)
                .finish(),
        }
    }
}

/// Discriminant of [`Unit`], handy for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Image,
    Text,
}

/// How an image unit is placed on its output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    /// Stretch to cover the whole output page, bleed included.
    FillToBleed,
    /// Scale uniformly to fit inside the safe zone, centred.
    #[default]
    ShrinkToSafeZone,
}

impl PlacementPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FillToBleed => "fill-to-bleed",
            Self::ShrinkToSafeZone => "shrink-to-safe-zone",
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementPolicy {
    type Err = TrimpressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fill-to-bleed" | "fill" | "bleed" => Ok(Self::FillToBleed),
            "shrink-to-safe-zone" | "shrink" | "safe" => Ok(Self::ShrinkToSafeZone),
            other => Err(TrimpressError::Config(format!(
                "unknown placement policy {other:?}"
            ))),
        }
    }
}

/// Whether a source arrives already paginated or as flowing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Fixed-layout pages (PDF, or a single raster image).
    Paginated,
    /// Paragraphs and embedded pictures without pagination (DOCX, plain text).
    Flowable,
}

impl SourceKind {
    /// Infer the source kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" | "png" | "jpg" | "jpeg" | "tif" | "tiff" | "gif" | "bmp" | "webp" => {
                Some(Self::Paginated)
            }
            "docx" | "txt" | "text" | "md" => Some(Self::Flowable),
            _ => None,
        }
    }
}

/// Built-in PDF fonts available for text units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextFont {
    #[default]
    Helvetica,
    HelveticaBold,
    TimesRoman,
    Courier,
}
