// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text flow — fits text into fixed-size frames one page at a time, reporting
// how much of the input each frame made visible.

use sammelwerk_core::error::{Result, SammelwerkError};
use tracing::debug;

use super::metrics::text_width;

/// Spaces substituted for each tab before layout.
const TAB_WIDTH: usize = 4;

/// A rectangular region text is flowed into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFrame {
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub line_height: f32,
}

impl TextFrame {
    /// Number of whole lines that fit in the frame.
    pub fn max_lines(&self) -> usize {
        if self.line_height <= 0.0 {
            return 0;
        }
        let lines = (self.height / self.line_height).floor();
        if lines.is_finite() && lines > 0.0 {
            lines as usize
        } else {
            0
        }
    }
}

/// The part of the input a single frame made visible.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFill {
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
    /// Bytes of the input consumed by these lines, including the line breaks
    /// and whitespace swallowed at wrap points.
    pub consumed: usize,
}

/// Normalise line endings, expand tabs and drop other control characters.
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut normalized = String::with_capacity(unified.len());
    for ch in unified.chars() {
        match ch {
            '\t' => normalized.push_str(&" ".repeat(TAB_WIDTH)),
            '\n' => normalized.push('\n'),
            ch if ch.is_control() => {}
            ch => normalized.push(ch),
        }
    }
    normalized
}

/// Fill one frame with as much of `text` as fits.
pub fn fill_frame(text: &str, frame: &TextFrame) -> FrameFill {
    let max_lines = frame.max_lines();
    let mut lines = Vec::new();
    let mut consumed = 0;

    while lines.len() < max_lines && consumed < text.len() {
        let (line, used) = next_line(&text[consumed..], frame.width, frame.font_size);
        lines.push(line);
        consumed += used;
    }

    FrameFill { lines, consumed }
}

/// Split `text` into frame-sized pages.
///
/// Every page advances the read cursor by at least one character; a frame that
/// cannot show anything fails with [`SammelwerkError::LayoutStalled`] instead of
/// producing pages forever.
pub fn paginate(text: &str, frame: &TextFrame) -> Result<Vec<Vec<String>>> {
    let mut pages = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        let fill = fill_frame(&text[cursor..], frame);
        if fill.consumed == 0 {
            return Err(SammelwerkError::LayoutStalled {
                remaining: text.len() - cursor,
            });
        }
        cursor += fill.consumed;
        debug!(
            page = pages.len() + 1,
            lines = fill.lines.len(),
            cursor,
            "Text frame filled"
        );
        pages.push(fill.lines);
    }

    Ok(pages)
}

/// Take the next visual line from the start of `text`.
///
/// Returns the line (without trailing whitespace) and the number of bytes it
/// consumed. Always consumes at least one character of non-empty input: a
/// word wider than the frame is broken mid-word, and a single glyph wider than
/// the frame is placed anyway.
fn next_line(text: &str, max_width: f32, font_size: f32) -> (String, usize) {
    let paragraph_end = text.find('\n').unwrap_or(text.len());
    let paragraph = &text[..paragraph_end];
    let newline_len = usize::from(paragraph_end < text.len());

    if text_width(paragraph, font_size) <= max_width {
        return (
            paragraph.trim_end().to_string(),
            paragraph_end + newline_len,
        );
    }

    let mut width = 0.0;
    let mut last_break: Option<usize> = None;
    let mut overflow_at = paragraph.len();

    for (offset, ch) in paragraph.char_indices() {
        let advance = text_width(ch.encode_utf8(&mut [0u8; 4]), font_size);
        if width + advance > max_width && offset > 0 {
            if ch.is_whitespace() {
                last_break = Some(offset);
            }
            overflow_at = offset;
            break;
        }
        width += advance;
        if ch.is_whitespace() {
            last_break = Some(offset);
        }
    }

    let (line_end, resume_at) = match last_break {
        Some(space) if !paragraph[..space].trim_end().is_empty() => (space, space),
        _ => (overflow_at, overflow_at),
    };

    // Swallow the whitespace at the wrap point so the next line starts on a word.
    let rest = &paragraph[resume_at..];
    let skipped = rest.len() - rest.trim_start_matches(' ').len();
    let mut used = resume_at + skipped;
    if used == paragraph_end {
        used += newline_len;
    }

    (paragraph[..line_end].trim_end().to_string(), used)
}
