// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Sammelwerk.

use thiserror::Error;

/// Top-level error type for all Sammelwerk operations.
///
/// Every variant is fatal to the current assembly run. Errors raised while
/// building an item's section are wrapped in [`SammelwerkError::Item`] so the
/// caller can tell the user which entry of the list needs fixing.
#[derive(Debug, Error)]
pub enum SammelwerkError {
    // -- Source errors --
    #[error("image could not be decoded: {0}")]
    InvalidImage(String),

    #[error("unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("text layout made no progress with {remaining} bytes left to place")]
    LayoutStalled { remaining: usize },

    // -- Output errors --
    #[error("export failed: {0}")]
    ExportFailed(String),

    /// A section builder failure, tagged with the item that caused it.
    #[error("item #{} ({title:?}) failed: {source}", .index + 1)]
    Item {
        /// Zero-based position of the item in the input list.
        index: usize,
        title: String,
        #[source]
        source: Box<SammelwerkError>,
    },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SammelwerkError {
    /// Wrap `self` with the position and title of the item being processed.
    pub fn for_item(self, index: usize, title: impl Into<String>) -> Self {
        Self::Item {
            index,
            title: title.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with any item context stripped away.
    pub fn cause(&self) -> &SammelwerkError {
        match self {
            Self::Item { source, .. } => source.cause(),
            other => other,
        }
    }

    /// Index and title of the item that failed, if the error came from one.
    pub fn failed_item(&self) -> Option<(usize, &str)> {
        match self {
            Self::Item { index, title, .. } => Some((*index, title.as_str())),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SammelwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_context_names_the_offending_entry() {
        let err = SammelwerkError::UnsupportedFile("notes.xyz".into()).for_item(2, "Notes");
        assert_eq!(err.failed_item(), Some((2, "Notes")));
        assert!(matches!(err.cause(), SammelwerkError::UnsupportedFile(_)));

        let message = err.to_string();
        assert!(message.contains("#3"), "{message}");
        assert!(message.contains("Notes"), "{message}");
    }

    #[test]
    fn plain_errors_have_no_item() {
        let err = SammelwerkError::ExportFailed("disk full".into());
        assert!(err.failed_item().is_none());
        assert!(matches!(err.cause(), SammelwerkError::ExportFailed(_)));
    }
}
