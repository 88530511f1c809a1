// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly configuration: page geometry and typography.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Geometry shared by every page the assembler generates. All values are in
/// PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Margin applied on all four sides.
    pub margin: f32,
    /// Space kept free above flowed text for the running header.
    pub header_gap: f32,
    /// Height of the "Table of Contents" title block on each TOC page.
    pub toc_header_height: f32,
    /// Vertical advance between TOC entries.
    pub toc_line_height: f32,
    /// Width of the right-aligned page-number column in the TOC.
    pub page_number_column: f32,
}

impl PageGeometry {
    /// US Letter, 8.5 x 11 in.
    pub const US_LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
        margin: 50.0,
        header_gap: 30.0,
        toc_header_height: 40.0,
        toc_line_height: 20.0,
        page_number_column: 50.0,
    };

    /// Number of TOC entries that fit on one TOC page.
    ///
    /// Both the TOC sizing pass and the layout pass derive their chunking from
    /// this value; never recompute it elsewhere. Always at least 1.
    pub fn toc_lines_per_page(&self) -> usize {
        let usable = self.height - 2.0 * self.margin - self.toc_header_height;
        let lines = (usable / self.toc_line_height).floor();
        if lines.is_finite() && lines >= 1.0 {
            lines as usize
        } else {
            1
        }
    }

    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(0.0)
    }

    /// Height available between the top and bottom margins.
    pub fn content_height(&self) -> f32 {
        (self.height - 2.0 * self.margin).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::US_LETTER
    }
}

/// Font sizes (points) for the built-in Helvetica family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    /// Flowed body text of text and word-processor items.
    pub body_size: f32,
    /// Line height as a multiple of the body size.
    pub line_spacing: f32,
    pub toc_title_size: f32,
    pub toc_entry_size: f32,
    /// Running header and page-number overlays.
    pub overlay_size: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            body_size: 11.0,
            line_spacing: 1.2,
            toc_title_size: 18.0,
            toc_entry_size: 12.0,
            overlay_size: 9.0,
        }
    }
}

/// Settings for one assembly run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub geometry: PageGeometry,
    pub typography: Typography,
    /// Heading printed at the top of every TOC page.
    pub toc_title: String,
    /// Title written to the output's document information dictionary.
    pub document_title: String,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            typography: Typography::default(),
            toc_title: "Table of Contents".into(),
            document_title: "Sammelwerk Bundle".into(),
        }
    }
}

impl AssemblyConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
