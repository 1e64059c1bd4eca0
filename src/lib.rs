//! Generator for the "La Sécurité des Travailleurs" brochure.
//!
//! The brochure is described as an ordered [`model::Story`] of content blocks, each paired with a
//! [`style::StyleDescriptor`], and rendered to an A4 PDF through `genpdf`.

pub mod brochure;
pub mod builder;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod model;
pub mod outline;
pub mod richtext;
pub mod style;

pub use brochure::{generate_document, generate_document_to, OUTPUT_FILENAME};
pub use error::{PdfBuildError, Result};
