//! Story rendering on top of `genpdf`.
//!
//! [`PdfBuilder`] owns the page template (paper size and margins), the style sheet and the
//! story.  Rendering converts every block into a `genpdf` element, lays the document out in
//! memory and optionally post-processes the bytes with [`crate::outline`].

use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{self, elements, Element, Margins, PageDecorator, PaperSize, Size};
use log::debug;

use crate::elements::{text_block, CalloutBoxElement, PageTracker, VerticalSpace};
use crate::error::{PdfBuildError, Result};
use crate::fonts;
use crate::model::{Block, Story};
use crate::outline::{self, Bookmark, DocumentInfo};
use crate::style::{mm_from_f64, StyleRole, StyleSheet};

/// Default page margin on every side, in millimetres.
pub const DEFAULT_MARGIN_MM: f64 = 20.0;

/// Base font size applied to the document before block styles.
const BASE_FONT_SIZE: u8 = 11;

/// Output of [`PdfBuilder::render`].
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    /// Serialized PDF document.
    pub bytes: Vec<u8>,
    /// Number of pages produced by the layout.
    pub page_count: usize,
    /// Page on which each story block started, indexed like [`Story::blocks`].
    pub block_pages: Vec<Option<usize>>,
    /// Bookmarks derived from the story headings.
    pub bookmarks: Vec<Bookmark>,
}

/// Builder that renders a [`Story`] into PDF bytes.
pub struct PdfBuilder {
    story: Story,
    styles: StyleSheet,
    paper_size: Size,
    margins: Margins,
    title: Option<String>,
    info: DocumentInfo,
    outline: bool,
}

impl PdfBuilder {
    /// Creates a builder for `story` with A4 paper, 2 cm margins and the brochure styles.
    pub fn new(story: Story) -> Self {
        Self {
            story,
            styles: StyleSheet::brochure(),
            paper_size: PaperSize::A4.into(),
            margins: Margins::all(mm_from_f64(DEFAULT_MARGIN_MM)),
            title: None,
            info: DocumentInfo::default(),
            outline: true,
        }
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets author, subject and keywords merged into the PDF metadata.
    pub fn with_info(mut self, info: DocumentInfo) -> Self {
        self.info = info;
        self
    }

    /// Enables or disables the bookmark and metadata post-processing pass.
    pub fn with_outline(mut self, outline: bool) -> Self {
        self.outline = outline;
        self
    }

    /// Lays out the story and returns the PDF bytes together with page information.
    pub fn render(self) -> Result<RenderedPdf> {
        let font_family = fonts::default_font_family().map_err(PdfBuildError::FontLoad)?;
        let mut document = genpdf::Document::new(font_family);
        document.set_paper_size(self.paper_size);
        document.set_font_size(BASE_FONT_SIZE);
        if let Some(title) = &self.title {
            document.set_title(title.clone());
        }

        let headings = self.story.headings();
        let blocks = self.story.into_blocks();
        debug!("Rendering story with {} blocks", blocks.len());

        let tracker = PageTracker::with_slots(blocks.len());
        document.set_page_decorator(PageTemplate::new(self.margins, tracker.clone()));

        for (index, block) in blocks.iter().enumerate() {
            match block {
                Block::Text(text) => {
                    let descriptor = self.styles.get(text.role());
                    let marked = tracker.mark(index, text_block(text.content(), descriptor));
                    document.push(marked.padded(descriptor.margins()));
                }
                Block::Spacer(height_mm) => {
                    document.push(tracker.mark(index, VerticalSpace::new(*height_mm)));
                }
                Block::PageBreak => document.push(elements::PageBreak::new()),
                Block::Callout(callout) => {
                    let descriptor = self.styles.get(StyleRole::Callout);
                    document.push(tracker.mark(
                        index,
                        CalloutBoxElement::new(
                            callout.content(),
                            descriptor,
                            callout.width_mm(),
                            callout.padding_pt(),
                        ),
                    ));
                }
            }
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;

        let page_count = tracker.page_count();
        let block_pages = tracker.starts();
        debug!("Laid out {} pages", page_count);

        let bookmarks: Vec<Bookmark> = headings
            .into_iter()
            .filter_map(|(index, title)| {
                block_pages
                    .get(index)
                    .copied()
                    .flatten()
                    .map(|page| Bookmark::new(title, page))
            })
            .collect();

        if self.outline {
            bytes = outline::apply_outline(&bytes, &bookmarks, &self.info)?;
        }

        Ok(RenderedPdf {
            bytes,
            page_count,
            block_pages,
            bookmarks,
        })
    }
}

/// Page decorator that applies the margins and counts pages.
struct PageTemplate {
    margins: Margins,
    tracker: PageTracker,
}

impl PageTemplate {
    fn new(margins: Margins, tracker: PageTracker) -> Self {
        Self { margins, tracker }
    }
}

impl PageDecorator for PageTemplate {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: Style,
    ) -> std::result::Result<genpdf::render::Area<'a>, Error> {
        self.tracker.next_page();
        area.add_margins(self.margins);
        Ok(area)
    }
}
