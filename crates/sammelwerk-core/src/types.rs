// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Sammelwerk document assembler.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of content an item holds, which selects how its section is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Pdf,
    Image,
    Text,
    /// Word-processor document (Office Open XML or RTF).
    WordDocument,
    Unknown,
}

impl ContentKind {
    /// Infer the content kind from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => Self::Image,
            "txt" | "text" | "md" | "log" | "csv" => Self::Text,
            "docx" | "doc" | "rtf" => Self::WordDocument,
            _ => Self::Unknown,
        }
    }

    /// Infer the content kind from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

/// Where an item's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSource {
    /// A file on disk, opened read-only when the section is built.
    Path(PathBuf),
    /// Bytes already held in memory.
    Bytes(Vec<u8>),
}

impl ItemSource {
    /// Read the full contents of the source.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Path(path) => Ok(std::fs::read(path)?),
            Self::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    /// Short human-readable description for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// One entry of the ordered list handed to the assembler.
///
/// Items are owned by the caller; the pipeline only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub source: ItemSource,
    pub title: String,
    /// Free-form description; empty when the user gave none.
    pub description: String,
    pub kind: ContentKind,
}

impl Item {
    /// Build an item for a file, inferring its kind from the extension and
    /// using the file name (without extension) as title.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let title = path
            .file_stem()
            .or_else(|| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source: ItemSource::Path(path.to_path_buf()),
            title,
            description: String::new(),
            kind: ContentKind::from_path(path),
        }
    }

    /// Build an item from in-memory bytes of a known kind.
    pub fn from_bytes(bytes: Vec<u8>, kind: ContentKind, title: impl Into<String>) -> Self {
        Self {
            source: ItemSource::Bytes(bytes),
            title: title.into(),
            description: String::new(),
            kind,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Running-header text for every page of this item's section.
    pub fn header_label(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{} — {}", self.title, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(ContentKind::from_extension("PDF"), ContentKind::Pdf);
        assert_eq!(ContentKind::from_extension("jpeg"), ContentKind::Image);
        assert_eq!(ContentKind::from_extension("txt"), ContentKind::Text);
        assert_eq!(ContentKind::from_extension("docx"), ContentKind::WordDocument);
        assert_eq!(ContentKind::from_extension("rtf"), ContentKind::WordDocument);
        assert_eq!(ContentKind::from_extension("xyz"), ContentKind::Unknown);
    }

    #[test]
    fn from_path_defaults_title_to_file_stem() {
        let item = Item::from_path("/tmp/reports/Quarterly Report.pdf");
        assert_eq!(item.title, "Quarterly Report");
        assert_eq!(item.kind, ContentKind::Pdf);
        assert!(item.description.is_empty());
    }

    #[test]
    fn path_without_extension_is_unknown() {
        let item = Item::from_path("README");
        assert_eq!(item.kind, ContentKind::Unknown);
        assert_eq!(item.title, "README");
    }

    #[test]
    fn header_label_omits_separator_without_description() {
        let item = Item::from_bytes(Vec::new(), ContentKind::Text, "Notes");
        assert_eq!(item.header_label(), "Notes");

        let item = item.with_description("draft");
        assert_eq!(item.header_label(), "Notes — draft");
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ItemSource::Path(dir.path().join("gone.txt"));
        assert!(matches!(
            source.read_bytes(),
            Err(crate::SammelwerkError::Io(_))
        ));
    }

    #[test]
    fn item_round_trips_through_json() {
        let item = Item::from_bytes(vec![1, 2, 3], ContentKind::Image, "Logo")
            .with_description("company mark");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"image\""));
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
