// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text reader. Paragraphs are separated by one or more blank lines;
// single line breaks inside a paragraph are kept.

use trimpress_core::error::{Result, TrimpressError};
use tracing::debug;

use crate::traits::FlowItem;

/// Split UTF-8 text into paragraphs.
pub fn read_plain_text(bytes: &[u8]) -> Result<Vec<FlowItem>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| TrimpressError::UnsupportedSource(format!("text is not UTF-8: {err}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut items = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                items.push(FlowItem::Paragraph(current.join("\n")));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        items.push(FlowItem::Paragraph(current.join("\n")));
    }

    debug!(paragraphs = items.len(), "Plain text read");
    Ok(items)
}
