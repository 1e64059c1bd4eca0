//! Error type shared by the rendering pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::outline::OutlineError;
use crate::richtext::MarkupError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PdfBuildError>;

/// Failures that can occur while assembling or writing the brochure.
#[derive(Debug, Error)]
pub enum PdfBuildError {
    /// No usable font family could be located or loaded.
    #[error("failed to load fonts: {0}")]
    FontLoad(#[source] genpdf::error::Error),

    /// `genpdf` failed while laying out or serializing the document.
    #[error("failed to render PDF: {0}")]
    Render(#[source] genpdf::error::Error),

    /// Inline markup of a text block is malformed.
    #[error("invalid markup in {text:?}")]
    Markup {
        /// Beginning of the offending text.
        text: String,
        /// Parser diagnostic.
        #[source]
        source: MarkupError,
    },

    /// Bookmarks or document information could not be added.
    #[error("failed to post-process PDF: {0}")]
    Outline(#[from] OutlineError),

    /// The output file could not be written.
    #[error("failed to write {}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl PdfBuildError {
    pub(crate) fn markup(text: &str, source: MarkupError) -> Self {
        const PREVIEW_CHARS: usize = 40;
        Self::Markup {
            text: text.chars().take(PREVIEW_CHARS).collect(),
            source,
        }
    }
}
