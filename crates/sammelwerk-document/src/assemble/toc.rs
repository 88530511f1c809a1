// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table of contents — a pure sizing pass that says how many TOC pages the
// entries need, and a layout pass that draws them using that count as the
// page-number offset. Both chunk entries by `PageGeometry::toc_lines_per_page`.

use serde::Serialize;
use sammelwerk_core::{AssemblyConfig, PageGeometry};
use tracing::{debug, error, info, instrument};

use super::concat::TocEntry;
use crate::geometry::Rect;
use crate::pdf::{PageCanvas, PageCollection, TextLine};
use crate::text::metrics::{text_width, truncate_to_width};

/// Clickable line in the TOC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TocLink {
    /// 0-based index of the TOC page the line is on.
    pub toc_page: usize,
    /// Bounding box of the entry text on that page.
    pub rect: Rect,
    /// 0-based index of the target page in the finished document.
    pub destination: usize,
}

/// Drawn TOC pages and the links to attach to them.
pub struct TocLayout {
    pub pages: PageCollection,
    pub links: Vec<TocLink>,
}

impl TocLayout {
    fn empty() -> Self {
        Self {
            pages: PageCollection::new(),
            links: Vec::new(),
        }
    }
}

/// Number of TOC pages needed for `entry_count` entries. Never zero.
pub fn toc_page_count(entry_count: usize, geometry: &PageGeometry) -> usize {
    entry_count.div_ceil(geometry.toc_lines_per_page()).max(1)
}

/// Draw the TOC for `entries`, numbering them as if `toc_pages` pages precede
/// the content.
///
/// If the pages cannot be produced an empty layout is returned; callers must
/// treat zero TOC pages as a failed export.
#[instrument(skip_all, fields(entries = entries.len(), toc_pages = toc_pages))]
pub fn layout_toc(entries: &[TocEntry], toc_pages: usize, config: &AssemblyConfig) -> TocLayout {
    let geometry = &config.geometry;
    let typography = &config.typography;
    let lines_per_page = geometry.toc_lines_per_page();

    let title_baseline = geometry.height - geometry.margin - typography.toc_title_size;
    let entries_top = geometry.height - geometry.margin - geometry.toc_header_height;
    let label_width = (geometry.content_width() - geometry.page_number_column).max(0.0);
    let number_right = geometry.width - geometry.margin;

    let chunks: Vec<&[TocEntry]> = if entries.is_empty() {
        vec![entries]
    } else {
        entries.chunks(lines_per_page).collect()
    };

    let mut canvas = PageCanvas::new(*geometry, &config.toc_title);
    let mut links = Vec::with_capacity(entries.len());

    for (toc_page, chunk) in chunks.iter().enumerate() {
        let mut lines = Vec::with_capacity(chunk.len() + 1);
        lines.push(TextLine::bold(
            config.toc_title.as_str(),
            geometry.margin,
            title_baseline,
            typography.toc_title_size,
        ));

        for (row, entry) in chunk.iter().enumerate() {
            let size = typography.toc_entry_size;
            let baseline = entries_top - row as f32 * geometry.toc_line_height - size;
            let label = truncate_to_width(&entry.label(), size, label_width);
            let final_page = entry.final_page(toc_pages);
            let number = final_page.to_string();

            links.push(TocLink {
                toc_page,
                rect: Rect::new(
                    geometry.margin,
                    baseline - 0.25 * size,
                    text_width(&label, size),
                    1.25 * size,
                ),
                destination: final_page - 1,
            });
            lines.push(TextLine::regular(label, geometry.margin, baseline, size));
            lines.push(TextLine::regular(
                number.as_str(),
                number_right - text_width(&number, size),
                baseline,
                size,
            ));
        }

        debug!(toc_page, entries = chunk.len(), "TOC page laid out");
        canvas.add_text_page(&lines);
    }

    match canvas.finish() {
        Ok(pages) => {
            info!(pages = pages.page_count(), links = links.len(), "Table of contents drawn");
            TocLayout { pages, links }
        }
        Err(err) => {
            error!(error = %err, "Could not draw table of contents");
            TocLayout::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(count: usize) -> Vec<TocEntry> {
        (0..count)
            .map(|n| TocEntry {
                title: format!("Item {n}"),
                description: String::new(),
                page: n + 1,
            })
            .collect()
    }

    #[test]
    fn sizing_pass_on_letter() {
        let letter = PageGeometry::default();
        assert_eq!(toc_page_count(0, &letter), 1);
        assert_eq!(toc_page_count(1, &letter), 1);
        assert_eq!(toc_page_count(32, &letter), 1);
        assert_eq!(toc_page_count(33, &letter), 2);
        assert_eq!(toc_page_count(64, &letter), 2);
        assert_eq!(toc_page_count(65, &letter), 3);
    }

    #[test]
    fn sizing_pass_on_a_tiny_page_still_progresses() {
        let tiny = PageGeometry {
            height: 100.0,
            ..PageGeometry::default()
        };
        assert_eq!(tiny.toc_lines_per_page(), 1);
        assert_eq!(toc_page_count(3, &tiny), 3);
    }

    #[test]
    fn layout_emits_as_many_pages_as_sized() {
        let config = AssemblyConfig::default();
        for count in [0, 1, 32, 33, 70] {
            let sized = toc_page_count(count, &config.geometry);
            let layout = layout_toc(&entries(count), sized, &config);
            assert_eq!(layout.pages.page_count(), sized, "{count} entries");
            assert_eq!(layout.links.len(), count);
        }
    }

    #[test]
    fn links_are_offset_by_toc_pages() {
        let config = AssemblyConfig::default();
        let layout = layout_toc(&entries(33), 2, &config);

        assert_eq!(layout.links[0].destination, 2);
        assert_eq!(layout.links[0].toc_page, 0);
        assert_eq!(layout.links[32].toc_page, 1);
        assert_eq!(layout.links[32].destination, 34);
    }

    #[test]
    fn link_boxes_stay_inside_the_margins() {
        let config = AssemblyConfig::default();
        let geometry = config.geometry;
        let layout = layout_toc(&entries(32), 1, &config);

        for link in &layout.links {
            assert!(link.rect.y >= geometry.margin);
            assert!(link.rect.top() <= geometry.height - geometry.margin - geometry.toc_header_height);
            assert!(link.rect.right() <= geometry.width - geometry.margin - geometry.page_number_column);
        }
    }

    #[test]
    fn long_labels_are_truncated_to_the_title_column() {
        let config = AssemblyConfig::default();
        let long = vec![TocEntry {
            title: "A very long title ".repeat(20),
            description: "with a description".into(),
            page: 1,
        }];
        let layout = layout_toc(&long, 1, &config);
        let max = config.geometry.content_width() - config.geometry.page_number_column;
        assert!(layout.links[0].rect.width <= max + 0.01);
    }
}
