// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Advance widths for the builtin PDF fonts, taken from the Adobe core-14 AFM
// files (WinAnsi glyphs for printable ASCII), in 1/1000 em.

use crate::types::TextFont;

/// Slot `i` is the width of ASCII `i + 32`, space through tilde.
type WidthTable = [u16; 95];

#[rustfmt::skip]
static HELVETICA: WidthTable = [
    // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // :   ;    <    =    >    ?    @
    278, 278, 584, 584, 584, 556, 1015,
    // A-M
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    // N-Z
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [   \    ]    ^    _    `
    278, 278, 278, 469, 556, 333,
    // a-m
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    // n-z
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // {   |    }    ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: WidthTable = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN: WidthTable = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

const COURIER_WIDTH: u16 = 600;

/// Width assumed for anything outside printable ASCII. No WinAnsi glyph in
/// the proportional fonts is wider.
const PROPORTIONAL_FALLBACK: u16 = 1000;

impl TextFont {
    /// Advance width of `ch` as a fraction of the font size.
    pub fn advance_em(&self, ch: char) -> f64 {
        let table = match self {
            Self::Helvetica => &HELVETICA,
            Self::HelveticaBold => &HELVETICA_BOLD,
            Self::TimesRoman => &TIMES_ROMAN,
            Self::Courier => return COURIER_WIDTH as f64 / 1000.0,
        };
        let width = match ch as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ => PROPORTIONAL_FALLBACK,
        };
        width as f64 / 1000.0
    }

    /// Rendered width of `text` as a fraction of the font size.
    pub fn text_width_em(&self, text: &str) -> f64 {
        text.chars().map(|ch| self.advance_em(ch)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_capitals_are_wider_than_lowercase() {
        let font = TextFont::Helvetica;
        assert_eq!(font.advance_em('W'), 0.944);
        assert_eq!(font.advance_em('i'), 0.222);
        assert_eq!(font.advance_em(' '), 0.278);
        assert_eq!(font.advance_em('~'), 0.584);
    }

    #[test]
    fn courier_is_monospaced() {
        let font = TextFont::Courier;
        assert_eq!(font.text_width_em("iiii"), font.text_width_em("WWWW"));
        assert!((font.text_width_em("abc") - 1.8).abs() < 1e-9);
    }

    #[test]
    fn non_ascii_is_measured_wide() {
        for font in [TextFont::Helvetica, TextFont::HelveticaBold, TextFont::TimesRoman] {
            assert_eq!(font.advance_em('é'), 1.0);
            assert!(font.advance_em('\t') >= font.advance_em('m'));
        }
    }

    #[test]
    fn tables_cover_every_printable_character() {
        for font in [TextFont::Helvetica, TextFont::HelveticaBold, TextFont::TimesRoman] {
            for ch in ' '..='~' {
                let width = font.advance_em(ch);
                assert!(width > 0.15 && width < 1.1, "{font:?} {ch:?} = {width}");
            }
        }
    }

    #[test]
    fn bold_is_never_narrower_than_regular_for_letters() {
        for ch in ('a'..='z').chain('A'..='Z') {
            assert!(
                TextFont::HelveticaBold.advance_em(ch) >= TextFont::Helvetica.advance_em(ch),
                "{ch:?}"
            );
        }
    }
}
