// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content concatenation — builds every item's section in order and records
// where each one starts.

use serde::Serialize;
use sammelwerk_core::error::Result;
use sammelwerk_core::types::Item;
use sammelwerk_core::AssemblyConfig;
use tracing::{debug, info, instrument, warn};

use super::section::build_section;
use crate::pdf::PageCollection;

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub description: String,
    /// 1-based page within the content pages, before the TOC is prepended.
    pub page: usize,
}

impl TocEntry {
    /// Text shown in the TOC line.
    pub fn label(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.description)
        }
    }

    /// 1-based page number in the finished document.
    pub fn final_page(&self, toc_pages: usize) -> usize {
        self.page + toc_pages
    }
}

/// All content pages in item order.
pub struct Content {
    pub pages: PageCollection,
    /// Running-header label for each content page.
    pub labels: Vec<String>,
    /// One entry per item, in item order.
    pub entries: Vec<TocEntry>,
}

/// Build and concatenate the sections of `items`.
///
/// The first failing item aborts the run; its error is wrapped with the
/// item's position and title.
#[instrument(skip_all, fields(items = items.len()))]
pub fn concatenate(items: &[Item], config: &AssemblyConfig) -> Result<Content> {
    let mut pages = PageCollection::new();
    let mut labels = Vec::new();
    let mut entries = Vec::with_capacity(items.len());
    let mut counter = 0;

    for (index, item) in items.iter().enumerate() {
        entries.push(TocEntry {
            title: item.title.clone(),
            description: item.description.clone(),
            page: counter + 1,
        });

        let section = build_section(item, config).map_err(|err| {
            warn!(index, title = %item.title, error = %err, "Item failed");
            err.for_item(index, item.title.as_str())
        })?;
        pages
            .append_all(&section.pages)
            .map_err(|err| err.for_item(index, item.title.as_str()))?;
        labels.extend(section.labels);

        debug!(index, start = counter + 1, pages = section.pages.page_count(), "Item appended");
        counter += section.pages.page_count();
    }

    info!(items = items.len(), pages = counter, "Content concatenated");
    Ok(Content {
        pages,
        labels,
        entries,
    })
}
