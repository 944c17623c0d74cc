// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trimpress: core types, page geometry, and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod geometry;
pub mod human_errors;
pub mod metrics;
pub mod types;

pub use config::ExportConfig;
pub use error::TrimpressError;
pub use geometry::{BleedSpec, compute_bleed_spec, output_rect, safe_rect, trim_rect};
pub use types::*;
