// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Finisher — joins TOC and content pages, wires the TOC links, and stamps
// running headers, page numbers and a separator rule into every page's top
// margin.

use chrono::Local;
use sammelwerk_core::error::{Result, SammelwerkError};
use sammelwerk_core::AssemblyConfig;
use tracing::{debug, info, instrument};

use super::concat::Content;
use super::toc::TocLayout;
use crate::geometry::Rect;
use crate::pdf::annotate::{add_link, add_overlay_font, rule_operations, stamp_overlay, text_operations};
use crate::pdf::{PageBox, PageCollection};
use crate::text::metrics::{text_width, truncate_to_width};

/// Overlay placement for one page, derived from that page's own media box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderStrip {
    /// Horizontal margin and height of the top strip.
    pub margin: f32,
    /// Distance from the top edge down to the top of the overlay text.
    pub inset: f32,
}

impl HeaderStrip {
    pub fn for_page(page: &PageBox, fixed_margin: f32) -> Self {
        // max/min rather than clamp: tiny pages can have min > max.
        Self {
            margin: fixed_margin.max(36.0).min(0.1 * page.width),
            inset: 20.0_f32.max(12.0).min(0.03 * page.height),
        }
    }

    /// The region of `page` reserved for overlays.
    pub fn area(&self, page: &PageBox) -> Rect {
        Rect::new(
            page.x,
            page.y + page.height - self.margin,
            page.width,
            self.margin,
        )
    }
}

/// Produce the finished document: TOC pages first, then content, with links,
/// overlays and metadata applied.
#[instrument(skip_all, fields(toc_pages = toc.pages.page_count(), content_pages = content.pages.page_count()))]
pub fn finish(toc: &TocLayout, content: &Content, config: &AssemblyConfig) -> Result<PageCollection> {
    let toc_pages = toc.pages.page_count();
    if toc_pages == 0 {
        return Err(SammelwerkError::ExportFailed(
            "table of contents produced no pages".into(),
        ));
    }

    let mut output = PageCollection::new();
    output.append_all(&toc.pages)?;
    output.append_all(&content.pages)?;
    let page_ids = output.page_ids();
    let total = page_ids.len();

    for link in &toc.links {
        let source = page_id(&page_ids, link.toc_page)?;
        let destination = page_id(&page_ids, link.destination)?;
        let target = output.page_box_of(destination)?;
        add_link(
            output.document_mut(),
            source,
            link.rect,
            destination,
            target.x,
            target.y + target.height,
        )?;
    }
    debug!(links = toc.links.len(), "TOC links attached");

    let font_id = add_overlay_font(output.document_mut());
    let size = config.typography.overlay_size;
    for (index, &target_id) in page_ids.iter().enumerate() {
        let page = output.page_box_of(target_id)?;
        let strip = HeaderStrip::for_page(&page, config.geometry.margin);
        let baseline = page.y + page.height - strip.inset - size;
        let left = page.x + strip.margin;
        let right = page.x + page.width - strip.margin;

        let number = format!("Page {} of {}", index + 1, total);
        let number_width = text_width(&number, size);
        let mut operations = text_operations(&number, right - number_width, baseline, size);

        let label = index
            .checked_sub(toc_pages)
            .and_then(|content_index| content.labels.get(content_index))
            .filter(|label| !label.is_empty());
        if let Some(label) = label {
            let available = (right - left - number_width - size).max(0.0);
            let label = truncate_to_width(label, size, available);
            operations.extend(text_operations(&label, left, baseline, size));
        }

        operations.extend(rule_operations(left, right, baseline - 0.4 * size));
        stamp_overlay(output.document_mut(), target_id, font_id, operations)?;
    }

    output.set_metadata(&config.document_title, Local::now());
    info!(pages = total, toc_pages, "Document finished");
    Ok(output)
}

fn page_id(page_ids: &[lopdf::ObjectId], index: usize) -> Result<lopdf::ObjectId> {
    page_ids.get(index).copied().ok_or_else(|| {
        SammelwerkError::ExportFailed(format!(
            "page {} out of range (document has {} pages)",
            index + 1,
            page_ids.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::toc::TocLink;
    use crate::pdf::annotate::tests::shown_text;
    use crate::pdf::collection::tests::sample_pdf;

    fn content(pages: usize) -> Content {
        let source = PageCollection::from_bytes(&sample_pdf(pages)).unwrap();
        let mut collection = PageCollection::new();
        collection.append_all(&source).unwrap();
        Content {
            pages: collection,
            labels: (1..=pages).map(|n| format!("Report {n}")).collect(),
            entries: Vec::new(),
        }
    }

    fn one_page_toc() -> TocLayout {
        let source = PageCollection::from_bytes(&sample_pdf(1)).unwrap();
        let mut pages = PageCollection::new();
        pages.append_all(&source).unwrap();
        TocLayout { pages, links: Vec::new() }
    }

    #[test]
    fn strip_on_letter_and_a4() {
        let letter = PageBox { x: 0.0, y: 0.0, width: 612.0, height: 792.0 };
        assert_eq!(HeaderStrip::for_page(&letter, 50.0), HeaderStrip { margin: 50.0, inset: 20.0 });

        let small = PageBox { x: 0.0, y: 0.0, width: 200.0, height: 300.0 };
        let strip = HeaderStrip::for_page(&small, 50.0);
        assert!((strip.margin - 20.0).abs() < 1e-4);
        assert!((strip.inset - 9.0).abs() < 1e-4);
    }

    #[test]
    fn empty_toc_is_an_export_failure() {
        let toc = TocLayout {
            pages: PageCollection::new(),
            links: Vec::new(),
        };
        let err = finish(&toc, &content(1), &AssemblyConfig::default()).err().unwrap();
        assert!(matches!(err, SammelwerkError::ExportFailed(_)));
    }

    #[test]
    fn links_and_overlays_land_on_the_right_pages() {
        let toc_source = PageCollection::from_bytes(&sample_pdf(1)).unwrap();
        let mut toc_pages = PageCollection::new();
        toc_pages.append_all(&toc_source).unwrap();
        let toc = TocLayout {
            pages: toc_pages,
            links: vec![TocLink {
                toc_page: 0,
                rect: Rect::new(50.0, 680.0, 100.0, 15.0),
                destination: 2,
            }],
        };

        let mut output = finish(&toc, &content(2), &AssemblyConfig::default()).unwrap();
        assert_eq!(output.page_count(), 3);

        let document = output.document();
        let toc_page = document.get_dictionary(output.page_id(0).unwrap()).unwrap();
        let annots = toc_page.get(b"Annots").unwrap().as_array().unwrap();
        let link = document.get_dictionary(annots[0].as_reference().unwrap()).unwrap();
        let dest = link.get(b"Dest").unwrap().as_array().unwrap();
        assert_eq!(dest[0].as_reference().unwrap(), output.page_id(2).unwrap());

        for index in 0..3 {
            let page = document.get_dictionary(output.page_id(index).unwrap()).unwrap();
            // q + original content + overlay
            assert_eq!(page.get(b"Contents").unwrap().as_array().unwrap().len(), 3);
        }

        let bytes = output.to_bytes().unwrap();
        assert_eq!(PageCollection::from_bytes(&bytes).unwrap().page_count(), 3);
    }

    #[test]
    fn overlays_number_every_page_and_label_only_content() {
        let content = content(2);
        let output = finish(&one_page_toc(), &content, &AssemblyConfig::default()).unwrap();
        let document = output.document();

        let toc_text = shown_text(document, output.page_id(0).unwrap());
        assert!(toc_text.iter().any(|text| text == "Page 1 of 3"), "{toc_text:?}");
        assert!(
            !toc_text.iter().any(|text| text.starts_with("Report")),
            "{toc_text:?}"
        );

        for index in 1..3 {
            let shown = shown_text(document, output.page_id(index).unwrap());
            let number = format!("Page {} of 3", index + 1);
            assert!(shown.contains(&number), "{shown:?}");
            assert!(shown.contains(&content.labels[index - 1]), "{shown:?}");
            let other = &content.labels[2 - index];
            assert!(!shown.contains(other), "{shown:?}");
        }
    }
}
