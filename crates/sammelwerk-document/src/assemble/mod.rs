// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly pipeline: sections -> concatenated content -> TOC sizing ->
// TOC layout -> finished document. A run either produces a complete
// document or an error; nothing is written on failure.

pub mod concat;
pub mod finish;
pub mod section;
pub mod toc;

use std::path::Path;

use sammelwerk_core::error::{Result, SammelwerkError};
use sammelwerk_core::types::Item;
use sammelwerk_core::AssemblyConfig;
use tracing::{info, instrument};

pub use concat::{Content, TocEntry, concatenate};
pub use finish::{HeaderStrip, finish};
pub use section::{EMPTY_TEXT_PLACEHOLDER, Section, build_section};
pub use toc::{TocLayout, TocLink, layout_toc, toc_page_count};

use crate::pdf::PageCollection;

/// Runs the assembly pipeline with a fixed configuration.
///
/// Holds no state between runs; one assembler can serve any number of
/// item lists, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    config: AssemblyConfig,
}

impl Assembler {
    /// Assembler with the default US Letter configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssemblyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Bundle `items`, in order, behind a linked table of contents.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn assemble(&self, items: &[Item]) -> Result<AssembledDocument> {
        let content = concatenate(items, &self.config)?;

        let toc_pages = toc_page_count(content.entries.len(), &self.config.geometry);
        let layout = layout_toc(&content.entries, toc_pages, &self.config);
        if layout.pages.page_count() != toc_pages && layout.pages.page_count() != 0 {
            return Err(SammelwerkError::ExportFailed(format!(
                "table of contents sized for {} pages but drew {}",
                toc_pages,
                layout.pages.page_count()
            )));
        }

        let collection = finish(&layout, &content, &self.config)?;
        info!(
            items = items.len(),
            toc_pages,
            pages = collection.page_count(),
            "Assembly complete"
        );

        Ok(AssembledDocument {
            collection,
            toc_pages,
            entries: content.entries,
            links: layout.links,
        })
    }
}

/// Assemble `items` with the default configuration.
pub fn assemble(items: &[Item]) -> Result<AssembledDocument> {
    Assembler::new().assemble(items)
}

/// Assemble on tokio's blocking pool and return the serialised PDF.
#[cfg(feature = "async")]
pub async fn assemble_async(config: AssemblyConfig, items: Vec<Item>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        Assembler::with_config(config)
            .assemble(&items)?
            .to_bytes()
    })
    .await
    .map_err(|err| {
        SammelwerkError::ExportFailed(format!("assembly task failed: {}", err))
    })?
}

/// The finished bundle.
pub struct AssembledDocument {
    collection: PageCollection,
    toc_pages: usize,
    entries: Vec<TocEntry>,
    links: Vec<TocLink>,
}

impl AssembledDocument {
    pub fn page_count(&self) -> usize {
        self.collection.page_count()
    }

    /// Number of leading TOC pages.
    pub fn toc_page_count(&self) -> usize {
        self.toc_pages
    }

    /// TOC entries in item order. Their `page` is relative to the content;
    /// use [`TocEntry::final_page`] for the page in this document.
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn links(&self) -> &[TocLink] {
        &self.links
    }

    pub fn collection(&self) -> &PageCollection {
        &self.collection
    }

    pub fn into_collection(self) -> PageCollection {
        self.collection
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.collection.to_bytes()
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.collection.save(path)
    }
}
