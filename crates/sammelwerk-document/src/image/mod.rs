// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding raster items and preparing them for placement on a
// page.

pub mod decoder;

pub use decoder::DecodedImage;
