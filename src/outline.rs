//! PDF post-processing built on top of `lopdf`.
//!
//! `genpdf` writes neither bookmarks nor the descriptive `/Info` entries beyond the title, so the
//! rendered bytes are reopened here to add a flat outline (one entry per section heading) and the
//! author, subject and keywords of the brochure.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use thiserror::Error;

/// Errors that can occur while post-processing a rendered PDF document.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    #[error("failed to parse PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    /// Serializing the updated document failed.
    #[error("failed to serialize PDF: {0}")]
    Write(#[from] std::io::Error),
    /// A required catalog entry was missing from the document trailer.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object was not a dictionary, preventing outline injection.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A referenced page number did not exist in the rendered document.
    #[error("bookmark {title:?} refers to missing page {page_number}")]
    MissingPage {
        /// Title of the bookmark whose page is missing.
        title: String,
        /// The requested (1-indexed) page number that could not be resolved.
        page_number: usize,
    },
}

/// Bookmark pointing at the first page of a section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bookmark {
    /// Text shown in the viewer's outline pane.
    pub title: String,
    /// 1-indexed destination page.
    pub page_number: usize,
}

impl Bookmark {
    /// Creates a bookmark.
    pub fn new(title: impl Into<String>, page_number: usize) -> Self {
        Self {
            title: title.into(),
            page_number,
        }
    }
}

/// Descriptive entries merged into the document information dictionary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    /// `/Title`, rewritten as a proper text string.
    pub title: Option<String>,
    /// `/Author`
    pub author: Option<String>,
    /// `/Subject`
    pub subject: Option<String>,
    /// `/Keywords`
    pub keywords: Option<String>,
}

impl DocumentInfo {
    fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Title", self.title.as_deref()),
            ("Author", self.author.as_deref()),
            ("Subject", self.subject.as_deref()),
            ("Keywords", self.keywords.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
    }

    fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// Encodes `text` as a PDF text string.
///
/// ASCII stays a literal string; anything else is written as UTF-16BE with a byte order mark.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xfe, 0xff];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Adds `bookmarks` and `info` to the PDF in `pdf_bytes` and returns the updated bytes.
///
/// The outline is flat: every bookmark is a direct child of the `/Outlines` root with a
/// `/Dest [page /Fit]` destination.  An outline root already referenced by the catalog is
/// reused, so the file never carries an orphaned empty root.
pub fn apply_outline(
    pdf_bytes: &[u8],
    bookmarks: &[Bookmark],
    info: &DocumentInfo,
) -> Result<Vec<u8>, OutlineError> {
    if bookmarks.is_empty() && info.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;

    if !bookmarks.is_empty() {
        let pages = document.get_pages();
        let entries = collect_outline_entries(&mut document, bookmarks, &pages)?;
        let outlines_id = match existing_outlines_root(&document) {
            Some(id) => id,
            None => document.new_object_id(),
        };
        link_outline_entries(outlines_id, &mut document, &entries);
        insert_outlines_root(outlines_id, &mut document, &entries)?;
    }

    if !info.is_empty() {
        merge_document_info(&mut document, info);
    }

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    bookmarks: &[Bookmark],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, OutlineError> {
    let mut entries = Vec::with_capacity(bookmarks.len());

    for bookmark in bookmarks {
        let page_ref = u32::try_from(bookmark.page_number)
            .ok()
            .and_then(|number| pages.get(&number).copied())
            .ok_or_else(|| OutlineError::MissingPage {
                title: bookmark.title.clone(),
                page_number: bookmark.page_number,
            })?;

        entries.push(OutlineEntry {
            object_id: document.new_object_id(),
            page_ref,
            title: bookmark.title.clone(),
        });
    }

    Ok(entries)
}

fn link_outline_entries(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) {
    for (index, entry) in entries.iter().enumerate() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", text_string(&entry.title));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entry.page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }

        if let Some(next) = entries.get(index + 1) {
            dictionary.set("Next", Object::Reference(next.object_id));
        }

        document
            .objects
            .insert(entry.object_id, Object::Dictionary(dictionary));
    }
}

fn catalog_id(document: &Document) -> Result<ObjectId, OutlineError> {
    document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| OutlineError::MissingCatalog)
}

fn existing_outlines_root(document: &Document) -> Option<ObjectId> {
    let catalog = document.get_dictionary(catalog_id(document).ok()?).ok()?;
    catalog.get(b"Outlines").and_then(Object::as_reference).ok()
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), OutlineError> {
    let catalog_id = catalog_id(document)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(OutlineError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| OutlineError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    Ok(())
}

fn merge_document_info(document: &mut Document, info: &DocumentInfo) {
    let existing = document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok();

    let info_dict = existing.and_then(|id| {
        document
            .objects
            .get_mut(&id)
            .and_then(|object| object.as_dict_mut().ok())
    });

    match info_dict {
        Some(dictionary) => {
            for (key, value) in info.entries() {
                dictionary.set(key, text_string(value));
            }
        }
        None => {
            let mut dictionary = Dictionary::new();
            for (key, value) in info.entries() {
                dictionary.set(key, text_string(value));
            }
            let info_id = document.add_object(Object::Dictionary(dictionary));
            document.trailer.set("Info", Object::Reference(info_id));
        }
    }
}
