// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Readers for flowable sources: text and pictures in reading order, no pages.

pub mod docx;
pub mod text;

pub use docx::read_docx;
pub use text::read_plain_text;
