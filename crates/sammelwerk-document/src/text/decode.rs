// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word-processor decoding. Office Open XML (.docx) is tried first, RTF second;
// if neither works the document is replaced by a placeholder line. Decoding
// never fails the assembly run.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, instrument, warn};
use zip::ZipArchive;

/// Text substituted when a word-processor file cannot be decoded at all.
pub const WORD_PLACEHOLDER: &str = "(Unable to load Word document.)";

/// Archive member holding the main body of a .docx package.
const DOCX_BODY: &str = "word/document.xml";

/// Which decoder produced a [`DecodedText`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedFormat {
    Docx,
    Rtf,
    Placeholder,
}

/// Plain paragraphs recovered from a word-processor document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Paragraphs joined with `\n`.
    pub text: String,
    pub format: DecodedFormat,
}

/// Decode a word-processor document, degrading to [`WORD_PLACEHOLDER`].
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn decode_word_document(data: &[u8]) -> DecodedText {
    match decode_docx(data) {
        Ok(text) => {
            debug!(chars = text.len(), "Decoded as Office Open XML");
            return DecodedText {
                text,
                format: DecodedFormat::Docx,
            };
        }
        Err(reason) => debug!(%reason, "Not a readable .docx, trying RTF"),
    }

    match decode_rtf(data) {
        Ok(text) => {
            debug!(chars = text.len(), "Decoded as RTF");
            DecodedText {
                text,
                format: DecodedFormat::Rtf,
            }
        }
        Err(reason) => {
            warn!(%reason, "Word document could not be decoded, using placeholder");
            DecodedText {
                text: WORD_PLACEHOLDER.to_string(),
                format: DecodedFormat::Placeholder,
            }
        }
    }
}

/// Extract paragraph text from the main part of a .docx package.
fn decode_docx(data: &[u8]) -> Result<String, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|err| format!("not a zip package: {}", err))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|err| format!("missing {}: {}", DOCX_BODY, err))?
        .read_to_string(&mut xml)
        .map_err(|err| format!("unreadable {}: {}", DOCX_BODY, err))?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // Tabs and breaks only count inside runs; <w:tabs> in paragraph
    // properties defines tab stops, not content.
    let mut in_run = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:r" => in_run = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e
                        .unescape()
                        .map_err(|err| format!("bad text run: {}", err))?;
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    err
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

/// Extract the text of an RTF document.
fn decode_rtf(data: &[u8]) -> Result<String, String> {
    let content = std::str::from_utf8(data).map_err(|err| format!("not RTF text: {}", err))?;
    if !content.trim_start().starts_with("{\\rtf") {
        return Err("missing {\\rtf header".into());
    }

    let document = rtf_parser::RtfDocument::try_from(content)
        .map_err(|err| format!("malformed RTF: {}", err))?;
    let text: String = document
        .body
        .iter()
        .map(|block| block.text.as_str())
        .collect();

    Ok(text)
}
