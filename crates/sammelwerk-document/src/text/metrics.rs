// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph metrics for the standard Helvetica font, plus WinAnsi encoding for
// text written directly into content streams.

/// Advance widths (1/1000 em) of Helvetica for printable ASCII, from the
/// Adobe core-14 AFM. Index 0 is the space character (0x20).
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Width used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

/// Advance width of `ch` at 1000 units per em.
fn glyph_width(ch: char) -> u16 {
    match ch {
        ' '..='~' => HELVETICA_ASCII[ch as usize - 0x20],
        '—' => 1000,
        '–' => 556,
        '…' => 1000,
        '‘' | '’' => 222,
        '“' | '”' => 333,
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` set in Helvetica at `size` points.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(glyph_width(ch))).sum();
    units as f32 * size / 1000.0
}

/// Shorten `text` with a trailing ellipsis so it fits within `max_width`.
pub fn truncate_to_width(text: &str, size: f32, max_width: f32) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let budget = max_width - text_width(ellipsis, size);
    let mut used = 0.0;
    let mut kept = String::new();
    for ch in text.chars() {
        let width = f32::from(glyph_width(ch)) * size / 1000.0;
        if used + width > budget {
            break;
        }
        used += width;
        kept.push(ch);
    }

    let mut truncated = kept.trim_end().to_string();
    truncated.push_str(ellipsis);
    truncated
}

/// Encode text for a standard-14 font with /WinAnsiEncoding.
///
/// Characters the encoding cannot represent become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}
