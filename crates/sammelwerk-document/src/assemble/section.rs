// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Section builder — turns one item into the pages it contributes to the
// bundle, plus one running-header label per page.

use sammelwerk_core::error::{Result, SammelwerkError};
use sammelwerk_core::types::{ContentKind, Item};
use sammelwerk_core::AssemblyConfig;
use tracing::{debug, instrument, warn};

use crate::geometry::Rect;
use crate::image::DecodedImage;
use crate::pdf::{PageCanvas, PageCollection, TextLine};
use crate::text::decode::decode_word_document;
use crate::text::flow::{TextFrame, normalize_text, paginate};

/// Line shown for a text item with no visible content.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "(Empty text file)";

/// The pages one item contributes, with their running-header labels.
pub struct Section {
    pub pages: PageCollection,
    /// One label per page, in page order.
    pub labels: Vec<String>,
}

impl Section {
    pub fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    fn with_uniform_label(pages: PageCollection, label: String) -> Self {
        let labels = vec![label; pages.page_count()];
        Self { pages, labels }
    }
}

/// Build the section for `item`.
#[instrument(skip_all, fields(title = %item.title, kind = ?item.kind))]
pub fn build_section(item: &Item, config: &AssemblyConfig) -> Result<Section> {
    let section = match item.kind {
        ContentKind::Pdf => pdf_section(item)?,
        ContentKind::Image => image_section(item, config)?,
        ContentKind::Text => {
            let text = read_text(item);
            flow_section(item, &text, config)?
        }
        ContentKind::WordDocument => {
            let bytes = item.source.read_bytes().unwrap_or_else(|err| {
                warn!(source = %item.source.describe(), error = %err, "Word document unreadable");
                Vec::new()
            });
            let decoded = decode_word_document(&bytes);
            debug!(format = ?decoded.format, "Word document decoded");
            flow_section(item, &decoded.text, config)?
        }
        ContentKind::Unknown => {
            return Err(SammelwerkError::UnsupportedFile(format!(
                "cannot tell what kind of content {} is",
                item.source.describe()
            )));
        }
    };

    debug!(pages = section.page_count(), "Section built");
    Ok(section)
}

fn pdf_section(item: &Item) -> Result<Section> {
    let pages = PageCollection::from_bytes(&item.source.read_bytes()?)?;
    if pages.page_count() == 0 {
        return Err(SammelwerkError::UnsupportedFile(format!(
            "{} is a PDF with no pages",
            item.source.describe()
        )));
    }
    Ok(Section::with_uniform_label(pages, item.header_label()))
}

fn image_section(item: &Item, config: &AssemblyConfig) -> Result<Section> {
    let image = DecodedImage::from_bytes(&item.source.read_bytes()?)?;
    let geometry = &config.geometry;
    let content_area = Rect::new(
        geometry.margin,
        geometry.margin,
        geometry.content_width(),
        geometry.content_height(),
    );
    let target = content_area.fit_centered(image.width() as f32, image.height() as f32);

    let mut canvas = PageCanvas::new(*geometry, &item.title);
    canvas.add_image_page(&image, target);
    let pages = canvas.finish()?;
    Ok(Section::with_uniform_label(pages, item.header_label()))
}

/// Source text of a text item. Missing, unreadable or non-UTF-8 sources read
/// as empty.
fn read_text(item: &Item) -> String {
    let bytes = match item.source.read_bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(source = %item.source.describe(), error = %err, "Text source unreadable, treating as empty");
            return String::new();
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(source = %item.source.describe(), error = %err, "Text source is not UTF-8, treating as empty");
            String::new()
        }
    }
}

/// Flow `text` onto as many pages as it needs, below the header gap.
fn flow_section(item: &Item, text: &str, config: &AssemblyConfig) -> Result<Section> {
    let geometry = &config.geometry;
    let typography = &config.typography;

    let mut text = normalize_text(text);
    if text.trim().is_empty() {
        text = EMPTY_TEXT_PLACEHOLDER.to_string();
    }

    let top = geometry.height - geometry.margin - geometry.header_gap;
    let frame = TextFrame {
        width: geometry.content_width(),
        height: (top - geometry.margin).max(0.0),
        font_size: typography.body_size,
        line_height: typography.body_size * typography.line_spacing,
    };
    let pages = paginate(&text, &frame)?;

    let mut canvas = PageCanvas::new(*geometry, &item.title);
    for page in &pages {
        let lines: Vec<TextLine> = page
            .iter()
            .enumerate()
            .map(|(row, line)| {
                let baseline = top - typography.body_size - row as f32 * frame.line_height;
                TextLine::regular(line.as_str(), geometry.margin, baseline, typography.body_size)
            })
            .collect();
        canvas.add_text_page(&lines);
    }

    let pages = canvas.finish()?;
    Ok(Section::with_uniform_label(pages, item.header_label()))
}
