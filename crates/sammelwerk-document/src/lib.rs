// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sammelwerk-document — Bundles PDFs, images, plain text and word-processor
// files into one PDF behind a linked table of contents.
//
// Provides section building (PDF page copying, image placement, text flow,
// .docx/RTF decoding), two-pass TOC layout, and a finisher that adds links,
// running headers and page numbers.

pub mod assemble;
pub mod geometry;
pub mod image;
pub mod pdf;
pub mod text;

// Re-export the entry points so callers can use `sammelwerk_document::assemble` etc.
pub use assemble::{AssembledDocument, Assembler, TocEntry, TocLink, assemble};
pub use pdf::PageCollection;

#[cfg(feature = "async")]
pub use assemble::assemble_async;
