// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page collections, page generation, annotations and overlays.

pub mod annotate;
pub mod canvas;
pub mod collection;

pub use canvas::{PageCanvas, TextLine};
pub use collection::{PageBox, PageCollection};
