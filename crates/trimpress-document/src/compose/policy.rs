// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image placement policies. All rectangles here are in PDF points.

use trimpress_core::geometry::{BleedSpec, output_rect, safe_rect};
use trimpress_core::types::{PlacementPolicy, Rect};

/// Where an image of `img_width` × `img_height` pixels lands on its page, and
/// whether it is stretched to that rectangle.
pub fn image_placement(
    policy: PlacementPolicy,
    spec: &BleedSpec,
    img_width: u32,
    img_height: u32,
) -> (Rect, bool) {
    match policy {
        PlacementPolicy::FillToBleed => (output_rect(spec).to_points(), true),
        PlacementPolicy::ShrinkToSafeZone => (
            fit_centered(
                img_width as f64,
                img_height as f64,
                &safe_rect(spec).to_points(),
            ),
            false,
        ),
    }
}

/// Largest rectangle with the image's aspect ratio that fits in `bounds`,
/// centred. Small images are scaled up.
pub fn fit_centered(img_width: f64, img_height: f64, bounds: &Rect) -> Rect {
    let scale = (bounds.width() / img_width).min(bounds.height() / img_height);
    let w = img_width * scale;
    let h = img_height * scale;
    let (cx, cy) = bounds.center();
    Rect::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
}
