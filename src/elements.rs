//! Element implementations built on top of `genpdf` primitives.
//!
//! `genpdf` ships paragraphs, layouts and page breaks but no fixed-height spacer, no filled box
//! and no way to learn where an element landed.  This module adds those three pieces and the
//! conversion of rich text into styled paragraph layouts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use genpdf::elements::{Break, LinearLayout, Paragraph};
use genpdf::error::Error;
use genpdf::fonts::FontCache;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Size};

use crate::richtext::{RichText, Span};
use crate::style::{mm_from_f64, mm_to_f64, points_to_mm, StyleDescriptor};

/// Builds the element for a styled text block.
///
/// Each forced line break starts a new paragraph; empty lines become one-line breaks.  The
/// descriptor's spacing and indentation are left to the caller, see
/// [`StyleDescriptor::margins`].
pub fn text_block(content: &RichText, descriptor: &StyleDescriptor) -> impl Element {
    let alignment = Alignment::from(descriptor.alignment());
    let mut layout = LinearLayout::vertical();

    for line in content.lines() {
        if line.is_empty() {
            layout.push(Break::new(1));
            continue;
        }
        let mut paragraph = Paragraph::default();
        for span in &line {
            paragraph.push(span.to_styled_string());
        }
        paragraph.set_alignment(alignment);
        layout.push(paragraph);
    }

    layout.styled(descriptor.to_style())
}

/// Fixed vertical gap.
///
/// A gap that does not fit on the current page is truncated at the page end instead of carrying
/// over to the next one.
pub struct VerticalSpace {
    height: Mm,
}

impl VerticalSpace {
    /// Creates a gap of `height_mm` millimetres.
    pub fn new(height_mm: f64) -> Self {
        Self {
            height: mm_from_f64(height_mm),
        }
    }
}

impl Element for VerticalSpace {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        result.size = Size::new(0, min_mm(self.height, area.size().height));
        Ok(result)
    }
}

fn min_mm(a: Mm, b: Mm) -> Mm {
    if a < b {
        a
    } else {
        b
    }
}

/// Distance between the strokes that fill the callout background.  Strokes are drawn with the
/// default 1 pt line width, so this must stay below 0.35 mm.
pub const FILL_STEP_MM: f64 = 0.25;

struct Word {
    string: StyledString,
    width: Mm,
    space_width: Mm,
}

/// A filled, single-cell box with centred text.
///
/// The text is wrapped word by word so the box height is known before anything is drawn; the
/// background is filled with horizontal strokes spaced [`FILL_STEP_MM`] apart and the lines are
/// printed on top of it.  The box never splits across pages.
pub struct CalloutBoxElement {
    spans: Vec<Span>,
    width: Mm,
    padding: Mm,
    background: Color,
    text_style: Style,
}

impl CalloutBoxElement {
    /// Creates a callout box from its content and text style.
    pub fn new(
        content: &RichText,
        descriptor: &StyleDescriptor,
        width_mm: f64,
        padding_pt: f64,
    ) -> Self {
        Self {
            spans: content.lines().into_iter().flatten().collect(),
            width: mm_from_f64(width_mm),
            padding: points_to_mm(padding_pt),
            background: descriptor.background().unwrap_or(Color::Rgb(0, 0, 0)),
            text_style: descriptor.to_style(),
        }
    }

    fn words(&self, style: Style, font_cache: &FontCache) -> Vec<Word> {
        let mut words = Vec::new();
        let mut after_space = true;
        for span in &self.spans {
            let mut base = span.to_styled_string();
            base.style = style.and(base.style);
            let leading_space = base.s.starts_with(char::is_whitespace);
            for (index, text) in base.s.split_whitespace().enumerate() {
                let string = StyledString::new(text.to_owned(), base.style);
                let width = string.width(font_cache);
                // Text continuing the previous span without whitespace is glued to it.
                let space_width = if index == 0 && !leading_space && !after_space {
                    Mm::default()
                } else {
                    StyledString::new(" ", base.style).width(font_cache)
                };
                words.push(Word {
                    string,
                    width,
                    space_width,
                });
            }
            after_space = base.s.ends_with(char::is_whitespace);
        }
        words
    }
}

/// Greedy line filling; a word wider than `max_width` gets a line of its own.
fn wrap_words(words: Vec<Word>, max_width: Mm) -> Vec<(Vec<Word>, Mm)> {
    let mut lines: Vec<(Vec<Word>, Mm)> = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut current_width = Mm::default();

    for word in words {
        let added = if current.is_empty() {
            word.width
        } else {
            word.space_width + word.width
        };
        if !current.is_empty() && current_width + added > max_width {
            lines.push((std::mem::take(&mut current), current_width));
            current_width = word.width;
        } else {
            current_width += added;
        }
        current.push(word);
    }

    if !current.is_empty() {
        lines.push((current, current_width));
    }
    lines
}

/// Vertical offsets of the fill strokes for a box of the given height, top and bottom included.
fn fill_offsets(height: Mm) -> Vec<Mm> {
    let steps = (mm_to_f64(height) / FILL_STEP_MM).ceil() as usize;
    (0..=steps)
        .map(|step| min_mm(mm_from_f64(FILL_STEP_MM * step as f64), height))
        .collect()
}

/// Paints a filled rectangle from the top of `area` using stacked horizontal strokes.
fn fill_rect(area: &render::Area<'_>, left: Mm, width: Mm, height: Mm, color: Color) {
    let stroke = Style::new().with_color(color);
    for y in fill_offsets(height) {
        area.draw_line(
            vec![Position::new(left, y), Position::new(left + width, y)],
            stroke,
        );
    }
}

impl Element for CalloutBoxElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.text_style);
        let available = area.size().width;
        let width = min_mm(self.width, available);
        let inner_width = width - self.padding - self.padding;
        let line_height = style.line_height(&context.font_cache);

        let lines = wrap_words(self.words(style, &context.font_cache), inner_width);
        let text_height = mm_to_f64(line_height) * lines.len() as f64;
        let height = mm_from_f64(text_height + 2.0 * mm_to_f64(self.padding));

        let mut result = RenderResult::default();
        if height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let left = (available - width) / 2.0;
        fill_rect(&area, left, width, height, self.background);

        for (index, (words, line_width)) in lines.iter().enumerate() {
            let x = left + self.padding + (inner_width - *line_width) / 2.0;
            let y = self.padding + mm_from_f64(mm_to_f64(line_height) * index as f64);
            let Some(mut section) =
                area.text_section(&context.font_cache, Position::new(x, y), style)
            else {
                result.has_more = true;
                return Ok(result);
            };
            for (position, word) in words.iter().enumerate() {
                if position > 0 && word.space_width > Mm::default() {
                    section.print_str(" ", word.string.style)?;
                }
                section.print_str(&word.string.s, word.string.style)?;
            }
        }

        result.size = Size::new(width, height);
        Ok(result)
    }
}

/// Shared record of the page on which each marked element started.
#[derive(Clone, Debug, Default)]
pub struct PageTracker {
    current: Rc<Cell<usize>>,
    starts: Rc<RefCell<Vec<Option<usize>>>>,
}

impl PageTracker {
    /// Creates a tracker with room for `slots` marked elements.
    pub fn with_slots(slots: usize) -> Self {
        Self {
            current: Rc::new(Cell::new(0)),
            starts: Rc::new(RefCell::new(vec![None; slots])),
        }
    }

    /// Advances to the next page and returns its 1-based number.
    pub fn next_page(&self) -> usize {
        let page = self.current.get() + 1;
        self.current.set(page);
        page
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.current.get()
    }

    /// First page of every marked element, `None` for elements that printed nothing.
    pub fn starts(&self) -> Vec<Option<usize>> {
        self.starts.borrow().clone()
    }

    /// Wraps `element` so the page it starts on is recorded in `slot`.
    pub fn mark<E: Element>(&self, slot: usize, element: E) -> PageMarker<E> {
        PageMarker {
            element,
            slot,
            tracker: self.clone(),
        }
    }

    fn record(&self, slot: usize) {
        let mut starts = self.starts.borrow_mut();
        if let Some(entry) = starts.get_mut(slot) {
            if entry.is_none() {
                *entry = Some(self.current.get());
            }
        }
    }
}

/// Element wrapper produced by [`PageTracker::mark`].
///
/// The page is recorded once the wrapped element reports a non-zero height.  Padding must
/// therefore be applied outside the marker: a padded element reports its padding even when the
/// content did not fit and moved on to the next page.
pub struct PageMarker<E> {
    element: E,
    slot: usize,
    tracker: PageTracker,
}

impl<E: Element> Element for PageMarker<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.element.render(context, area, style)?;
        if result.size.height > Mm::default() {
            self.tracker.record(self.slot);
        }
        Ok(result)
    }
}
