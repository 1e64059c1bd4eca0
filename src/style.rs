//! Style descriptors for the brochure.
//!
//! A [`StyleDescriptor`] is a named, immutable bundle of presentation attributes.  The values
//! follow typographic conventions (sizes and spacing in points) and are converted to `genpdf`
//! styles and millimetre margins when the story is rendered.

use genpdf::style::{Color, Style};
use genpdf::{Alignment, Margins, Mm};

/// Millimetres per typographic point.
pub const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Ratio between a font's natural line height and its size for the Helvetica metrics.
const NATURAL_LINE_HEIGHT_RATIO: f64 = 1.15;

/// Dark blue used for the main title.
pub const TITLE_BLUE: Color = Color::Rgb(0x1a, 0x54, 0x90);
/// Blue used for section headings, the conclusion and the callout background.
pub const HEADING_BLUE: Color = Color::Rgb(0x2c, 0x5f, 0x8d);
/// Grey used for the tagline under the title.
pub const TAGLINE_GREY: Color = Color::Rgb(0x55, 0x55, 0x55);
/// Grey used for the footer line.
pub const FOOTER_GREY: Color = Color::Rgb(0x80, 0x80, 0x80);
/// White text on the callout box.
pub const WHITE: Color = Color::Rgb(0xff, 0xff, 0xff);

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

pub(crate) fn points_to_mm(points: f64) -> Mm {
    mm_from_f64(points * MM_PER_POINT)
}

/// Horizontal alignment of a text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified paragraphs.
    Justified,
}

impl From<HorizontalAlignment> for Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            // genpdf has no justification; ragged-right is the closest rendering.
            HorizontalAlignment::Left | HorizontalAlignment::Justified => Alignment::Left,
            HorizontalAlignment::Center => Alignment::Center,
            HorizontalAlignment::Right => Alignment::Right,
        }
    }
}

/// Visual role a block plays in the brochure; each role maps to one descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleRole {
    /// Main title on the first page.
    Title,
    /// Italic line under the title.
    Tagline,
    /// Section heading.
    Heading,
    /// Running body text.
    Body,
    /// Bulleted or numbered list entry.
    ListItem,
    /// Closing paragraph.
    Conclusion,
    /// Text inside the callout box.
    Callout,
    /// Copyright line at the end of the document.
    Footer,
}

/// Named bundle of presentation attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleDescriptor {
    name: &'static str,
    font_size: u8,
    leading: Option<f64>,
    color: Option<Color>,
    background: Option<Color>,
    alignment: HorizontalAlignment,
    bold: bool,
    italic: bool,
    space_before: f64,
    space_after: f64,
    left_indent: f64,
}

impl StyleDescriptor {
    /// Creates a descriptor with the given name and font size in points.
    pub fn new(name: &'static str, font_size: u8) -> Self {
        Self {
            name,
            font_size,
            leading: None,
            color: None,
            background: None,
            alignment: HorizontalAlignment::Left,
            bold: false,
            italic: false,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
        }
    }

    /// Derives a new descriptor from `self` under a different name.
    pub fn derive(&self, name: &'static str) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = font_size;
        self
    }

    fn with_leading(mut self, leading: f64) -> Self {
        self.leading = Some(leading);
        self
    }

    fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn with_space_before(mut self, points: f64) -> Self {
        self.space_before = points;
        self
    }

    fn with_space_after(mut self, points: f64) -> Self {
        self.space_after = points;
        self
    }

    fn with_left_indent(mut self, points: f64) -> Self {
        self.left_indent = points;
        self
    }

    /// Name of the descriptor.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Font size in points.
    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    /// Distance between baselines in points, if fixed.
    pub fn leading(&self) -> Option<f64> {
        self.leading
    }

    /// Text color, if not inherited.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Fill color behind the text, used by the callout box.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Horizontal alignment.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Whether the whole block is bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Whether the whole block is italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Space above the block in points.
    pub fn space_before(&self) -> f64 {
        self.space_before
    }

    /// Space below the block in points.
    pub fn space_after(&self) -> f64 {
        self.space_after
    }

    /// Left indentation in points.
    pub fn left_indent(&self) -> f64 {
        self.left_indent
    }

    /// Builds the `genpdf` text style for this descriptor.
    pub fn to_style(&self) -> Style {
        let mut style = Style::new().with_font_size(self.font_size);
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        if let Some(leading) = self.leading {
            let natural = f64::from(self.font_size) * NATURAL_LINE_HEIGHT_RATIO;
            style.set_line_spacing(leading / natural);
        }
        style
    }

    /// Margins that realise the spacing and indentation around the block.
    pub fn margins(&self) -> Margins {
        Margins::trbl(
            points_to_mm(self.space_before),
            Mm::default(),
            points_to_mm(self.space_after),
            points_to_mm(self.left_indent),
        )
    }
}

/// The fixed set of descriptors used by the brochure.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    title: StyleDescriptor,
    tagline: StyleDescriptor,
    heading: StyleDescriptor,
    body: StyleDescriptor,
    list_item: StyleDescriptor,
    conclusion: StyleDescriptor,
    callout: StyleDescriptor,
    footer: StyleDescriptor,
}

impl StyleSheet {
    /// Builds the brochure palette and typography.
    pub fn brochure() -> Self {
        let body = StyleDescriptor::new("CustomBody", 11)
            .with_alignment(HorizontalAlignment::Justified)
            .with_space_after(12.0)
            .with_leading(16.0);

        Self {
            title: StyleDescriptor::new("CustomTitle", 28)
                .bold()
                .with_color(TITLE_BLUE)
                .with_alignment(HorizontalAlignment::Center)
                .with_space_after(30.0),
            tagline: body
                .derive("Intro")
                .with_font_size(12)
                .with_color(TAGLINE_GREY)
                .with_alignment(HorizontalAlignment::Center)
                .italic(),
            heading: StyleDescriptor::new("CustomSubtitle", 18)
                .bold()
                .with_color(HEADING_BLUE)
                .with_space_before(20.0)
                .with_space_after(12.0),
            list_item: StyleDescriptor::new("CustomList", 11)
                .with_left_indent(20.0)
                .with_space_after(8.0)
                .with_leading(14.0),
            conclusion: body
                .derive("Conclusion")
                .italic()
                .with_color(HEADING_BLUE),
            callout: body
                .derive("FinalBox")
                .with_font_size(10)
                .with_alignment(HorizontalAlignment::Center)
                .with_color(WHITE)
                .with_background(HEADING_BLUE)
                .with_space_after(0.0),
            footer: body
                .derive("Footer")
                .with_font_size(8)
                .with_alignment(HorizontalAlignment::Center)
                .with_color(FOOTER_GREY)
                .italic()
                .with_space_after(0.0),
            body,
        }
    }

    /// Returns the descriptor for `role`.
    pub fn get(&self, role: StyleRole) -> &StyleDescriptor {
        match role {
            StyleRole::Title => &self.title,
            StyleRole::Tagline => &self.tagline,
            StyleRole::Heading => &self.heading,
            StyleRole::Body => &self.body,
            StyleRole::ListItem => &self.list_item,
            StyleRole::Conclusion => &self.conclusion,
            StyleRole::Callout => &self.callout,
            StyleRole::Footer => &self.footer,
        }
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::brochure()
    }
}
