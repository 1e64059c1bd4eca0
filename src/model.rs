//! Data structures describing the logical content of the brochure.
//!
//! A [`Story`] is the ordered list of [`Block`]s handed to the renderer.  Text blocks pair parsed
//! [`RichText`] with the [`StyleRole`] that selects their descriptor; spacers, page breaks and the
//! callout box complete the vocabulary.  The types do not reference `genpdf` elements so the story
//! can be inspected and tested without fonts.

use crate::error::{PdfBuildError, Result};
use crate::richtext::RichText;
use crate::style::StyleRole;

/// Text paired with the role that selects its style descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    role: StyleRole,
    content: RichText,
}

impl TextBlock {
    /// Parses `markup` and creates a text block for `role`.
    pub fn from_markup(role: StyleRole, markup: &str) -> Result<Self> {
        let content =
            RichText::parse(markup).map_err(|err| PdfBuildError::markup(markup.trim(), err))?;
        Ok(Self { role, content })
    }

    /// Returns the style role of the block.
    pub fn role(&self) -> StyleRole {
        self.role
    }

    /// Returns the parsed content.
    pub fn content(&self) -> &RichText {
        &self.content
    }
}

/// Single-cell highlighted table used for the closing message.
#[derive(Clone, Debug, PartialEq)]
pub struct CalloutBox {
    content: RichText,
    width_mm: f64,
    padding_pt: f64,
}

impl CalloutBox {
    /// Parses `markup` into a callout box of the given width.
    pub fn from_markup(markup: &str, width_mm: f64, padding_pt: f64) -> Result<Self> {
        let content =
            RichText::parse(markup).map_err(|err| PdfBuildError::markup(markup.trim(), err))?;
        Ok(Self {
            content,
            width_mm,
            padding_pt,
        })
    }

    /// Returns the parsed content.
    pub fn content(&self) -> &RichText {
        &self.content
    }

    /// Box width in millimetres.
    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    /// Inner padding in points on every side.
    pub fn padding_pt(&self) -> f64 {
        self.padding_pt
    }
}

/// Individual content blocks that make up the story.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Styled text: title, tagline, heading, paragraph, list item or footer.
    Text(TextBlock),
    /// Fixed vertical gap in millimetres.
    Spacer(f64),
    /// Explicit page break request.
    PageBreak,
    /// Highlighted callout box.
    Callout(CalloutBox),
}

impl Block {
    /// Returns the style role for text and callout blocks.
    pub fn role(&self) -> Option<StyleRole> {
        match self {
            Block::Text(text) => Some(text.role()),
            Block::Callout(_) => Some(StyleRole::Callout),
            Block::Spacer(_) | Block::PageBreak => None,
        }
    }

    /// Returns the parsed text of text and callout blocks.
    pub fn content(&self) -> Option<&RichText> {
        match self {
            Block::Text(text) => Some(text.content()),
            Block::Callout(callout) => Some(callout.content()),
            Block::Spacer(_) | Block::PageBreak => None,
        }
    }
}

/// Ordered sequence of blocks consumed by the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Story {
    blocks: Vec<Block>,
}

impl Story {
    /// Creates an empty story.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text block parsed from `markup`.
    pub fn text(&mut self, role: StyleRole, markup: &str) -> Result<&mut Self> {
        self.blocks
            .push(Block::Text(TextBlock::from_markup(role, markup)?));
        Ok(self)
    }

    /// Appends one list item per entry in `items`.
    pub fn list<'a, I>(&mut self, items: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for item in items {
            self.text(StyleRole::ListItem, item)?;
        }
        Ok(self)
    }

    /// Appends a vertical gap expressed in centimetres.
    pub fn spacer_cm(&mut self, height_cm: f64) -> &mut Self {
        self.blocks.push(Block::Spacer(height_cm * 10.0));
        self
    }

    /// Appends an explicit page break.
    pub fn page_break(&mut self) -> &mut Self {
        self.blocks.push(Block::PageBreak);
        self
    }

    /// Appends a callout box.
    pub fn callout(&mut self, callout: CalloutBox) -> &mut Self {
        self.blocks.push(Block::Callout(callout));
        self
    }

    /// Returns the blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Consumes the story and returns its blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Returns `(block index, plain text)` for every heading, in order.
    pub fn headings(&self) -> Vec<(usize, String)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| match block {
                Block::Text(text) if text.role() == StyleRole::Heading => {
                    Some((index, text.content().plain_text()))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of explicit page breaks.
    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::PageBreak))
            .count()
    }
}
