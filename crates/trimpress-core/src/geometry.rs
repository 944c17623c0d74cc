// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trim, bleed, and safe-zone geometry.
//
// All values are in inches. Bleed adds 0.125" to the width (outer edge) and
// 0.25" to the height (top and bottom). The safe zone sits a constant 0.375"
// inside the trim line, not the output edge.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrimpressError};
use crate::types::{Rect, TrimSize};

/// Extra width added when bleed is enabled.
pub const BLEED_WIDTH_IN: f64 = 0.125;
/// Extra height added when bleed is enabled.
pub const BLEED_HEIGHT_IN: f64 = 0.25;
/// Distance from the output edge to the trim line when bleed is enabled.
pub const TRIM_OFFSET_IN: f64 = 0.125;
/// Distance from the trim line to the safe zone.
pub const SAFE_MARGIN_IN: f64 = 0.375;

/// Output page dimensions derived from a trim size and bleed flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BleedSpec {
    pub output_width: f64,
    pub output_height: f64,
    pub trim_offset: f64,
    pub safe_margin: f64,
}

impl BleedSpec {
    /// Output page size in PDF points.
    pub fn output_size_pt(&self) -> (f64, f64) {
        (
            self.output_width * crate::POINTS_PER_INCH,
            self.output_height * crate::POINTS_PER_INCH,
        )
    }

    /// Inset from the output edge to the safe zone.
    pub fn safe_inset(&self) -> f64 {
        self.trim_offset + self.safe_margin
    }
}

/// Derive the bleed-inclusive output size for `trim`.
///
/// Fails with `InvalidGeometry` when the trim is non-finite, non-positive, or
/// too small to leave a safe zone of positive area.
pub fn compute_bleed_spec(trim: TrimSize, bleed_enabled: bool) -> Result<BleedSpec> {
    if !(trim.width_in.is_finite() && trim.height_in.is_finite()) {
        return Err(TrimpressError::InvalidGeometry(format!(
            "trim size {trim} is not finite"
        )));
    }
    if trim.width_in <= 0.0 || trim.height_in <= 0.0 {
        return Err(TrimpressError::InvalidGeometry(format!(
            "trim size {trim} must be positive"
        )));
    }

    let (extra_w, extra_h, trim_offset) = if bleed_enabled {
        (BLEED_WIDTH_IN, BLEED_HEIGHT_IN, TRIM_OFFSET_IN)
    } else {
        (0.0, 0.0, 0.0)
    };

    let spec = BleedSpec {
        output_width: trim.width_in + extra_w,
        output_height: trim.height_in + extra_h,
        trim_offset,
        safe_margin: SAFE_MARGIN_IN,
    };

    let safe = safe_rect(&spec);
    if safe.width() <= 0.0 || safe.height() <= 0.0 {
        return Err(TrimpressError::InvalidGeometry(format!(
            "trim size {trim} leaves no safe zone ({:.3} x {:.3} in)",
            safe.width(),
            safe.height()
        )));
    }

    Ok(spec)
}

/// The safe zone, in inches from the output page's bottom-left corner.
pub fn safe_rect(spec: &BleedSpec) -> Rect {
    let inset = spec.safe_inset();
    Rect::new(
        inset,
        inset,
        spec.output_width - inset,
        spec.output_height - inset,
    )
}

/// The whole output page, bleed included.
pub fn output_rect(spec: &BleedSpec) -> Rect {
    Rect::new(0.0, 0.0, spec.output_width, spec.output_height)
}

/// The cut line, inset `trim_offset` from every output edge.
pub fn trim_rect(spec: &BleedSpec) -> Rect {
    let t = spec.trim_offset;
    Rect::new(t, t, spec.output_width - t, spec.output_height - t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn square_with_bleed_matches_platform_numbers() {
        let spec = compute_bleed_spec(TrimSize::new(8.5, 8.5), true).unwrap();
        assert!(approx(spec.output_width, 8.625));
        assert!(approx(spec.output_height, 8.75));
        assert!(approx(spec.trim_offset, 0.125));
        assert!(approx(spec.safe_margin, 0.375));

        let safe = safe_rect(&spec);
        assert!(approx(safe.x0, 0.5));
        assert!(approx(safe.y0, 0.5));
        assert!(approx(safe.x1, 8.125));
        assert!(approx(safe.y1, 8.25));
    }

    #[test]
    fn no_bleed_measures_safe_zone_from_output_edge() {
        let spec = compute_bleed_spec(TrimSize::new(6.0, 9.0), false).unwrap();
        assert!(approx(spec.output_width, 6.0));
        assert!(approx(spec.output_height, 9.0));
        assert!(approx(spec.trim_offset, 0.0));
        assert_eq!(safe_rect(&spec), Rect::new(0.375, 0.375, 5.625, 8.625));
        assert_eq!(trim_rect(&spec), output_rect(&spec));
    }

    #[test]
    fn output_size_in_points() {
        let spec = compute_bleed_spec(TrimSize::new(8.5, 8.5), true).unwrap();
        let (w, h) = spec.output_size_pt();
        assert!(approx(w, 621.0));
        assert!(approx(h, 630.0));
    }

    #[test]
    fn tiny_trim_is_rejected() {
        let err = compute_bleed_spec(TrimSize::new(0.75, 4.0), false).unwrap_err();
        assert!(matches!(err, TrimpressError::InvalidGeometry(_)));
        // 0.75 + 0.125 bleed still leaves a negative width once the 1.0" inset is taken.
        assert!(compute_bleed_spec(TrimSize::new(0.75, 4.0), true).is_err());
    }

    #[test]
    fn non_positive_and_nan_trims_are_rejected() {
        assert!(compute_bleed_spec(TrimSize::new(0.0, 9.0), true).is_err());
        assert!(compute_bleed_spec(TrimSize::new(-6.0, 9.0), true).is_err());
        assert!(compute_bleed_spec(TrimSize::new(f64::NAN, 9.0), true).is_err());
    }

    proptest! {
        #[test]
        fn bleed_adds_fixed_amounts(w in 1.5f64..20.0, h in 1.5f64..20.0, bleed: bool) {
            let spec = compute_bleed_spec(TrimSize::new(w, h), bleed).unwrap();
            let flag = if bleed { 1.0 } else { 0.0 };
            prop_assert!(approx(spec.output_width, w + 0.125 * flag));
            prop_assert!(approx(spec.output_height, h + 0.25 * flag));
        }

        #[test]
        fn safe_zone_inside_trim_inside_output(w in 1.5f64..20.0, h in 1.5f64..20.0, bleed: bool) {
            let spec = compute_bleed_spec(TrimSize::new(w, h), bleed).unwrap();
            let output = output_rect(&spec);
            let trim = trim_rect(&spec);
            let safe = safe_rect(&spec);
            prop_assert!(output.contains(&trim));
            prop_assert!(trim.contains(&safe));
            prop_assert!(safe.width() > 0.0 && safe.height() > 0.0);
        }
    }
}
