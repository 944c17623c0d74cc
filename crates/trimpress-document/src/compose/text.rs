// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Centred text placement, measured with the builtin fonts' advance widths.

use serde::Serialize;
use trimpress_core::config::ExportConfig;
use trimpress_core::types::{Rect, TextFont};

/// Line pitch as a multiple of the font size.
pub const LINE_HEIGHT_EM: f64 = 1.2;
const FONT_STEP_PT: f64 = 1.0;
const ELLIPSIS: &str = "...";

/// Font settings for text units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: TextFont,
    /// Size tried first, in points.
    pub font_size: f64,
    /// Smallest size tried before truncating.
    pub min_font_size: f64,
}

impl TextStyle {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            font: config.font,
            font_size: config.font_size as f64,
            min_font_size: config.min_font_size as f64,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// One positioned line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub rect: Rect,
}

/// A wrapped, sized, and positioned block of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub font_size: f64,
    /// Bounding box of all lines.
    pub rect: Rect,
    /// Wrapped lines that did not fit and were dropped.
    pub dropped_lines: usize,
}

impl TextBlock {
    pub fn is_truncated(&self) -> bool {
        self.dropped_lines > 0
    }
}

/// Wrap `content` into `bounds`, shrinking the font in 1pt steps down to the
/// style's minimum, and truncating only if the text still does not fit.
///
/// Lines are broken and centred on their measured advance widths, so every
/// line stays inside `bounds` unless a single glyph is wider than it.
pub fn layout_text(content: &str, bounds: &Rect, style: &TextStyle) -> TextBlock {
    let font = style.font;
    let mut size = style.font_size.max(style.min_font_size);

    loop {
        let max_em = bounds.width() / size;
        let lines = wrap(content, font, max_em);
        let capacity = (bounds.height() / (size * LINE_HEIGHT_EM)).floor() as usize;

        if lines.len() <= capacity {
            return position(lines, bounds, size, font, 0);
        }
        if size <= style.min_font_size {
            let dropped = lines.len() - capacity;
            let kept = truncate(lines, capacity, font, max_em);
            return position(kept, bounds, size, font, dropped);
        }
        size = (size - FONT_STEP_PT).max(style.min_font_size);
    }
}

/// Greedy word wrap to `max_em` font-size units. Explicit newlines are kept;
/// words wider than a line are split.
fn wrap(content: &str, font: TextFont, max_em: f64) -> Vec<String> {
    let space_em = font.advance_em(' ');
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        let mut current = String::new();
        let mut current_em = 0.0;
        for mut word in paragraph.split_whitespace() {
            let mut word_em = font.text_width_em(word);
            if word_em > max_em {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_em = 0.0;
                }
                while word_em > max_em {
                    let (piece, rest) = word.split_at(fitting_prefix(word, font, max_em));
                    lines.push(piece.to_string());
                    word = rest;
                    word_em = font.text_width_em(word);
                }
                if word.is_empty() {
                    continue;
                }
            }
            if !current.is_empty() && current_em + space_em + word_em > max_em {
                lines.push(std::mem::take(&mut current));
                current_em = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_em += space_em;
            }
            current.push_str(word);
            current_em += word_em;
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Byte length of the longest prefix of `word` no wider than `max_em`.
/// Always at least one character, so splitting makes progress.
fn fitting_prefix(word: &str, font: TextFont, max_em: f64) -> usize {
    let mut width = 0.0;
    for (at, ch) in word.char_indices() {
        width += font.advance_em(ch);
        if width > max_em {
            return if at == 0 { ch.len_utf8() } else { at };
        }
    }
    word.len()
}

fn truncate(mut lines: Vec<String>, capacity: usize, font: TextFont, max_em: f64) -> Vec<String> {
    lines.truncate(capacity);
    if let Some(last) = lines.last_mut() {
        let room = max_em - font.text_width_em(ELLIPSIS);
        let mut width = 0.0;
        let kept: String = last
            .chars()
            .take_while(|&ch| {
                width += font.advance_em(ch);
                width <= room
            })
            .collect();
        let mut shortened = kept.trim_end().to_string();
        shortened.push_str(ELLIPSIS);
        *last = shortened;
    }
    lines
}

fn position(
    lines: Vec<String>,
    bounds: &Rect,
    size: f64,
    font: TextFont,
    dropped_lines: usize,
) -> TextBlock {
    let pitch = size * LINE_HEIGHT_EM;
    let (cx, cy) = bounds.center();
    let block_height = pitch * lines.len() as f64;
    let top = cy + block_height / 2.0;

    let mut widest: f64 = 0.0;
    let lines: Vec<TextLine> = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let width = font.text_width_em(&text) * size;
            widest = widest.max(width);
            let y1 = top - pitch * i as f64;
            TextLine {
                rect: Rect::new(cx - width / 2.0, y1 - pitch, cx + width / 2.0, y1),
                text,
            }
        })
        .collect();

    TextBlock {
        lines,
        font_size: size,
        rect: Rect::new(
            cx - widest / 2.0,
            top - block_height,
            cx + widest / 2.0,
            top,
        ),
        dropped_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trimpress_core::geometry::{compute_bleed_spec, safe_rect};
    use trimpress_core::types::TrimSize;

    fn style(size: f64, min: f64) -> TextStyle {
        TextStyle {
            font: TextFont::Helvetica,
            font_size: size,
            min_font_size: min,
        }
    }

    // Courier is 0.6 em per glyph, so `n` characters fit in `0.6 * n + 0.1` em.
    fn courier_em(chars: usize) -> f64 {
        0.6 * chars as f64 + 0.1
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(
            wrap("the quick brown fox", TextFont::Courier, courier_em(9)),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn wrap_splits_overlong_words() {
        assert_eq!(
            wrap("abcdefghij xy", TextFont::Courier, courier_em(4)),
            vec!["abcd", "efgh", "ij", "xy"]
        );
    }

    #[test]
    fn wrap_keeps_hard_breaks() {
        assert_eq!(
            wrap("roses\nare red", TextFont::Helvetica, 40.0),
            vec!["roses", "are red"]
        );
    }

    #[test]
    fn wrap_uses_glyph_widths() {
        // Ten of each fit in 5 em of Helvetica only for the narrow glyph.
        assert_eq!(wrap("iiiiiiiiii", TextFont::Helvetica, 5.0).len(), 1);
        assert_eq!(wrap("WWWWWWWWWW", TextFont::Helvetica, 5.0).len(), 2);
    }

    #[test]
    fn capitals_stay_inside_the_safe_zone() {
        let spec = compute_bleed_spec(TrimSize::new(8.5, 8.5), true).unwrap();
        let safe = safe_rect(&spec).to_points();
        let page = Rect::new(0.0, 0.0, spec.output_size_pt().0, spec.output_size_pt().1);
        let content = "WWWWWWWWWW ".repeat(30);
        let style = TextStyle::default();

        let block = layout_text(&content, &safe, &style);

        assert!(!block.lines.is_empty());
        assert!(safe.contains(&block.rect));
        let (cx, _) = safe.center();
        for line in &block.lines {
            let measured = style.font.text_width_em(&line.text) * block.font_size;
            assert!(measured <= safe.width() + 1e-9, "{:?} is {measured}pt", line.text);
            assert!((line.rect.width() - measured).abs() < 1e-9);
            assert!(safe.contains(&line.rect) && page.contains(&line.rect));
            assert!((line.rect.center().0 - cx).abs() < 1e-9);
        }
    }

    #[test]
    fn truncated_line_with_ellipsis_still_fits() {
        let bounds = Rect::new(0.0, 0.0, 120.0, 20.0);
        // Four words per 8pt line, two lines of room.
        let content = "MMMM ".repeat(12);
        let block = layout_text(&content, &bounds, &style(14.0, 8.0));
        assert_eq!(block.font_size, 8.0);
        assert_eq!(block.dropped_lines, 1);
        assert!(block.is_truncated());
        let last = block.lines.last().unwrap();
        assert!(last.text.ends_with(ELLIPSIS));
        assert!(TextFont::Helvetica.text_width_em(&last.text) * block.font_size <= bounds.width() + 1e-9);
        assert!(bounds.contains(&block.rect));
    }

    #[test]
    fn short_text_keeps_its_size_and_is_centred() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let block = layout_text("Hello", &bounds, &style(14.0, 8.0));
        assert_eq!(block.font_size, 14.0);
        assert_eq!(block.lines.len(), 1);
        assert!(!block.is_truncated());
        let (cx, cy) = block.rect.center();
        assert!((cx - 200.0).abs() < 1e-9 && (cy - 200.0).abs() < 1e-9);
        assert!(bounds.contains(&block.rect));
    }

    #[test]
    fn long_text_shrinks_before_truncating() {
        // 10 lines of 14pt need 168pt; 125pt first fits them at 10pt.
        let bounds = Rect::new(0.0, 0.0, 1000.0, 125.0);
        let content = vec!["word"; 10].join("\n");
        let block = layout_text(&content, &bounds, &style(14.0, 8.0));
        assert_eq!(block.font_size, 10.0);
        assert_eq!(block.lines.len(), 10);
        assert!(!block.is_truncated());
        assert!(bounds.contains(&block.rect));
    }

    #[test]
    fn text_that_never_fits_is_truncated_and_reported() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let content = "lorem ipsum dolor sit amet ".repeat(40);
        let block = layout_text(&content, &bounds, &style(14.0, 8.0));
        assert_eq!(block.font_size, 8.0);
        assert!(block.is_truncated());
        // 50 / 9.6 leaves room for five lines.
        assert_eq!(block.lines.len(), 5);
        assert!(block.lines[4].text.ends_with(ELLIPSIS));
        assert!(bounds.contains(&block.rect));
    }

    #[test]
    fn fractional_minimum_is_reached() {
        let bounds = Rect::new(0.0, 0.0, 1000.0, 10.0);
        let block = layout_text("a\nb", &bounds, &style(12.0, 7.5));
        assert_eq!(block.font_size, 7.5);
        assert!(block.is_truncated());
    }

    proptest! {
        #[test]
        fn every_line_fits_its_bounds(
            content in "[ -~\n]{0,400}",
            width in 40.0f64..500.0,
            height in 20.0f64..500.0,
        ) {
            let bounds = Rect::new(10.0, 10.0, 10.0 + width, 10.0 + height);
            let block = layout_text(&content, &bounds, &style(14.0, 8.0));
            for line in &block.lines {
                prop_assert!(bounds.contains(&line.rect), "{:?} at {:?}", line.text, line.rect);
            }
        }
    }
}
