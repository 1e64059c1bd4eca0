//! Inline markup for brochure text.
//!
//! Paragraph text is authored with a small tag vocabulary: `<b>…</b>` for bold, `<i>…</i>` for
//! italic and `<br/>` for a forced line break.  [`parse_markup`] turns it into [`Inline`] items
//! carrying [`Span`]s, which convert into `genpdf` [`StyledString`]s at render time.  Runs of
//! whitespace collapse to a single space since the literal text is wrapped across source lines.

use std::fmt;

use genpdf::style::{Style, StyledString};

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
}

impl Span {
    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span should be rendered in italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`]; color and size come from the block style.
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

/// One item of parsed markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    /// Styled text.
    Text(Span),
    /// Forced line break (`<br/>`).
    LineBreak,
}

/// Parsed inline content of a text block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichText {
    inlines: Vec<Inline>,
}

impl RichText {
    /// Parses `markup` into rich text.
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        parse_markup(markup).map(|inlines| Self { inlines })
    }

    /// Splits the content at forced line breaks.
    ///
    /// Consecutive breaks yield empty lines, which render as blank lines.
    pub fn lines(&self) -> Vec<Vec<Span>> {
        let mut lines = vec![Vec::new()];
        for inline in &self.inlines {
            match inline {
                Inline::Text(span) => {
                    if let Some(line) = lines.last_mut() {
                        line.push(span.clone());
                    }
                }
                Inline::LineBreak => lines.push(Vec::new()),
            }
        }
        lines
    }

    /// Returns the text without styling, line breaks rendered as spaces.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(span) => text.push_str(span.text()),
                Inline::LineBreak => {
                    if !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
            }
        }
        text.trim_end().to_owned()
    }
}

/// Parse errors produced by [`parse_markup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupError {
    index: usize,
    message: String,
}

impl MarkupError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte index in the original input string where the error was detected.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description of the parsing error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for MarkupError {}

#[derive(Clone, Copy, Debug, Default)]
struct StyleState {
    bold: bool,
    italic: bool,
}

impl StyleState {
    fn to_span(self, text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
}

impl Marker {
    fn closing_tag(self) -> &'static str {
        match self {
            Marker::Bold => "</b>",
            Marker::Italic => "</i>",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Marker::Bold => "bold span",
            Marker::Italic => "italic span",
        }
    }
}

const LINE_BREAK_TAGS: &[&str] = &["<br/>", "<br />", "<br>"];

/// Parses the brochure markup into a list of [`Inline`] items.
///
/// Tags must be balanced and properly nested; any other `<…>` construct is rejected with a
/// [`MarkupError`] that records the byte offset of the problem.
pub fn parse_markup(input: &str) -> Result<Vec<Inline>, MarkupError> {
    let (inlines, index) = parse_inner(input, 0, StyleState::default(), None)?;
    debug_assert_eq!(index, input.len());
    Ok(collapse_whitespace(inlines))
}

fn parse_inner(
    input: &str,
    mut index: usize,
    state: StyleState,
    closing_marker: Option<Marker>,
) -> Result<(Vec<Inline>, usize), MarkupError> {
    let mut inlines = Vec::new();
    let mut buffer = String::new();

    while index < input.len() {
        let rest = &input[index..];

        if let Some(marker) = closing_marker {
            if rest.starts_with(marker.closing_tag()) {
                flush_buffer(&mut buffer, &mut inlines, state);
                index += marker.closing_tag().len();
                return Ok((inlines, index));
            }
        }

        if let Some(tag) = LINE_BREAK_TAGS.iter().find(|tag| rest.starts_with(**tag)) {
            flush_buffer(&mut buffer, &mut inlines, state);
            inlines.push(Inline::LineBreak);
            index += tag.len();
            continue;
        }

        if let Some((marker, tag_len)) = opening_marker(rest) {
            flush_buffer(&mut buffer, &mut inlines, state);
            let mut nested_state = state;
            match marker {
                Marker::Bold => nested_state.bold = true,
                Marker::Italic => nested_state.italic = true,
            }
            let (nested, new_index) =
                parse_inner(input, index + tag_len, nested_state, Some(marker))?;
            inlines.extend(nested);
            index = new_index;
            continue;
        }

        if rest.starts_with("</") {
            return Err(MarkupError::new(index, "unexpected closing tag"));
        }

        if rest.starts_with('<') {
            return Err(MarkupError::new(
                index,
                "unsupported tag; expected `<b>`, `<i>` or `<br/>`",
            ));
        }

        if let Some(ch) = rest.chars().next() {
            buffer.push(ch);
            index += ch.len_utf8();
        }
    }

    if let Some(marker) = closing_marker {
        Err(MarkupError::new(
            index,
            format!("unterminated {}", marker.description()),
        ))
    } else {
        flush_buffer(&mut buffer, &mut inlines, state);
        Ok((inlines, index))
    }
}

fn opening_marker(rest: &str) -> Option<(Marker, usize)> {
    if rest.starts_with("<b>") {
        Some((Marker::Bold, 3))
    } else if rest.starts_with("<i>") {
        Some((Marker::Italic, 3))
    } else {
        None
    }
}

fn flush_buffer(buffer: &mut String, inlines: &mut Vec<Inline>, state: StyleState) {
    if buffer.is_empty() {
        return;
    }
    inlines.push(Inline::Text(state.to_span(std::mem::take(buffer))));
}

/// Collapses whitespace runs across span boundaries and trims every line.
fn collapse_whitespace(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut result: Vec<Inline> = Vec::with_capacity(inlines.len());
    // Start of a line counts as whitespace so leading blanks are dropped.
    let mut previous_space = true;

    for inline in inlines {
        match inline {
            Inline::Text(mut span) => {
                let mut collapsed = String::with_capacity(span.text.len());
                for ch in span.text.chars() {
                    if ch.is_whitespace() {
                        if !previous_space {
                            collapsed.push(' ');
                        }
                        previous_space = true;
                    } else {
                        collapsed.push(ch);
                        previous_space = false;
                    }
                }
                if !collapsed.is_empty() {
                    span.text = collapsed;
                    result.push(Inline::Text(span));
                }
            }
            Inline::LineBreak => {
                trim_line_end(&mut result);
                result.push(Inline::LineBreak);
                previous_space = true;
            }
        }
    }

    trim_line_end(&mut result);
    result
}

fn trim_line_end(inlines: &mut Vec<Inline>) {
    while let Some(Inline::Text(span)) = inlines.last_mut() {
        let trimmed_len = span.text.trim_end().len();
        span.text.truncate(trimmed_len);
        if span.text.is_empty() {
            inlines.pop();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(inlines: &[Inline]) -> Vec<&str> {
        inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text(span) => Some(span.text()),
                Inline::LineBreak => None,
            })
            .collect()
    }

    #[test]
    fn span_to_style_reflects_flags() {
        let inlines = parse_markup("<b><i>Bonjour</i></b>").expect("parse succeeds");
        let Some(Inline::Text(span)) = inlines.first() else {
            panic!("expected a text span");
        };
        let styled = span.to_styled_string();
        assert_eq!(styled.s, "Bonjour");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
        assert_eq!(styled.style.color(), None);
    }

    #[test]
    fn parse_plain_text() {
        let inlines = parse_markup("Bonjour le monde").expect("parse succeeds");
        assert_eq!(inlines.len(), 1);
        assert_eq!(texts(&inlines), ["Bonjour le monde"]);
    }

    #[test]
    fn parse_nested_styles() {
        let inlines = parse_markup("Une <b>très <i>belle</i></b> journée").expect("parse succeeds");
        let spans: Vec<&Span> = inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text(span) => Some(span),
                Inline::LineBreak => None,
            })
            .collect();
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].text(), "Une ");
        assert!(!spans[0].is_bold());
        assert_eq!(spans[1].text(), "très ");
        assert!(spans[1].is_bold());
        assert!(!spans[1].is_italic());
        assert_eq!(spans[2].text(), "belle");
        assert!(spans[2].is_bold());
        assert!(spans[2].is_italic());
        assert_eq!(spans[3].text(), " journée");
        assert!(!spans[3].is_bold());
    }

    #[test]
    fn collapses_wrapped_source_whitespace() {
        let inlines = parse_markup("  La sécurité\n        au   travail  ").expect("parse succeeds");
        assert_eq!(texts(&inlines), ["La sécurité au travail"]);
    }

    #[test]
    fn line_breaks_split_lines_and_trim() {
        let text = RichText::parse("<b>Titre :</b><br/>\n   Suite du texte.<br/><br/>Fin")
            .expect("parse succeeds");
        let lines = text.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0][0].text(), "Titre :");
        assert_eq!(lines[1][0].text(), "Suite du texte.");
        assert!(lines[2].is_empty());
        assert_eq!(lines[3][0].text(), "Fin");
    }

    #[test]
    fn plain_text_drops_markup() {
        let text = RichText::parse("<b>Conclusion</b>").expect("parse succeeds");
        assert_eq!(text.plain_text(), "Conclusion");

        let text = RichText::parse("A<br/>B").expect("parse succeeds");
        assert_eq!(text.plain_text(), "A B");
    }

    #[test]
    fn error_on_unterminated_bold() {
        let err = parse_markup("<b>oups").unwrap_err();
        assert!(err.message().contains("unterminated bold"));
    }

    #[test]
    fn error_on_misnested_tags() {
        let err = parse_markup("<b><i>x</b></i>").unwrap_err();
        assert!(err.message().contains("unexpected closing tag"));
        assert_eq!(err.index(), 7);
    }

    #[test]
    fn error_on_unknown_tag() {
        let err = parse_markup("<u>souligné</u>").unwrap_err();
        assert!(err.message().contains("unsupported tag"));
        assert_eq!(err.index(), 0);
    }
}
