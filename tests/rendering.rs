use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use securite_travailleurs::brochure::{self, GenerateOptions};
use securite_travailleurs::builder::{PdfBuilder, RenderedPdf};
use securite_travailleurs::fonts;
use securite_travailleurs::model::Story;
use securite_travailleurs::outline::text_string;
use securite_travailleurs::style::StyleRole;
use securite_travailleurs::OUTPUT_FILENAME;
use sha2::{Digest, Sha256};

const A4_POINTS: (f32, f32) = (595.28, 841.89);

/// `#2c5f8d` as PDF colour components.
const CALLOUT_BLUE: [f32; 3] = [0x2c as f32 / 255.0, 0x5f as f32 / 255.0, 0x8d as f32 / 255.0];

fn fonts_ready(test: &str) -> bool {
    let available = fonts::default_fonts_available();
    if !available {
        eprintln!(
            "Skipping {test}: Liberation Sans not found. Set SECURITE_PDF_FONTS_DIR or copy assets/fonts next to the binary."
        );
    }
    available
}

fn render(test: &str, options: GenerateOptions) -> Option<RenderedPdf> {
    if !fonts_ready(test) {
        return None;
    }
    Some(brochure::render_brochure(options).expect("render brochure"))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Zeroes the alphanumeric bytes between each `start` marker and the next `end` marker.
fn blank_between(data: &mut [u8], start: &[u8], end: &[u8]) {
    let mut offset = 0;
    while let Some(found) = find(&data[offset..], start) {
        let from = offset + found + start.len();
        let Some(len) = find(&data[from..], end) else {
            break;
        };
        for byte in &mut data[from..from + len] {
            if byte.is_ascii_alphanumeric() {
                *byte = b'0';
            }
        }
        offset = from + len + end.len();
    }
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let mut normalized = bytes.to_vec();
    blank_between(&mut normalized, b"/CreationDate", b")");
    blank_between(&mut normalized, b"/ModDate", b")");
    blank_between(&mut normalized, b"/ID", b"]");
    for tag in ["xmp:CreateDate", "xmp:ModifyDate", "xmp:MetadataDate"] {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        blank_between(&mut normalized, open.as_bytes(), close.as_bytes());
    }
    for tag in ["xmpMM:DocumentID", "xmpMM:InstanceID"] {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        blank_between(&mut normalized, open.as_bytes(), close.as_bytes());
    }
    Sha256::digest(&normalized).into()
}

fn catalog(document: &Document) -> &Dictionary {
    document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .and_then(|id| document.get_dictionary(id))
        .expect("catalog")
}

fn info(document: &Document) -> Option<&Dictionary> {
    document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| document.get_dictionary(id))
        .ok()
}

fn outline_titles(document: &Document) -> Vec<Vec<u8>> {
    let Ok(outlines) = catalog(document)
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .and_then(|id| document.get_dictionary(id))
    else {
        return Vec::new();
    };

    let mut titles = Vec::new();
    let mut next = outlines.get(b"First").and_then(Object::as_reference).ok();
    while let Some(id) = next {
        let entry = document.get_dictionary(id).expect("outline entry");
        let title = entry
            .get(b"Title")
            .and_then(Object::as_str)
            .expect("outline title");
        titles.push(title.to_vec());
        next = entry.get(b"Next").and_then(Object::as_reference).ok();
    }
    titles
}

fn string_bytes(object: Object) -> Vec<u8> {
    match object {
        Object::String(bytes, _) => bytes,
        _ => panic!("expected a string object"),
    }
}

fn pages(document: &Document) -> Vec<(u32, ObjectId)> {
    document.get_pages().into_iter().collect()
}

/// Extracted text of every page, whitespace removed.
fn page_texts(document: &Document) -> Vec<String> {
    pages(document)
        .into_iter()
        .map(|(number, _)| {
            document
                .extract_text(&[number])
                .expect("extract page text")
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .collect()
        })
        .collect()
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

#[test]
fn renders_valid_a4_pdf_with_at_least_four_pages() {
    let Some(pdf) = render("renders_valid_a4_pdf", GenerateOptions::default()) else {
        return;
    };
    assert!(pdf.bytes.starts_with(b"%PDF-"), "missing PDF header");

    let document = Document::load_mem(&pdf.bytes).expect("page tree parses");
    let pages = pages(&document);
    assert!(pages.len() >= 4, "expected at least 4 pages, got {}", pages.len());
    assert_eq!(pages.len(), pdf.page_count);

    for (page_number, id) in pages {
        let media_box = document
            .get_dictionary(id)
            .and_then(|page| page.get(b"MediaBox"))
            .and_then(Object::as_array)
            .expect("page media box");
        let values: Vec<f32> = media_box.iter().filter_map(number).collect();
        assert_eq!(values.len(), 4, "page {page_number} media box");
        assert!((values[2] - values[0] - A4_POINTS.0).abs() < 1.0);
        assert!((values[3] - values[1] - A4_POINTS.1).abs() < 1.0);
    }
}

#[test]
fn headings_appear_once_in_order_in_page_text() {
    let Some(pdf) = render("headings_appear_once", GenerateOptions::default()) else {
        return;
    };
    let document = Document::load_mem(&pdf.bytes).expect("pdf parses");
    let text = page_texts(&document).concat();

    let fragments = [
        "1.LesRisquesProfessionnels",
        "2.LesMesuresdePr",
        "l'EntrepriseetduTravailleur",
        "Conclusion",
    ];
    let mut previous = 0;
    for fragment in fragments {
        assert_eq!(text.matches(fragment).count(), 1, "{fragment} occurrences");
        let position = text.find(fragment).unwrap_or_default();
        assert!(position >= previous, "{fragment} out of order");
        previous = position;
    }
}

#[test]
fn callout_and_footer_are_printed_on_last_page() {
    let Some(pdf) = render("callout_and_footer_last_page", GenerateOptions::default()) else {
        return;
    };
    let document = Document::load_mem(&pdf.bytes).expect("pdf parses");
    let texts = page_texts(&document);
    let last = texts.last().expect("at least one page");
    assert!(last.contains("Retenezceci"), "callout missing from last page");
    assert!(last.contains("2025"), "footer missing from last page");

    let count = pdf.block_pages.len();
    assert_eq!(pdf.block_pages[count - 1], Some(pdf.page_count));
    assert_eq!(pdf.block_pages[count - 3], Some(pdf.page_count));
}

#[test]
fn callout_background_is_filled_in_heading_blue() {
    let Some(pdf) = render("callout_background", GenerateOptions::default()) else {
        return;
    };
    let document = Document::load_mem(&pdf.bytes).expect("pdf parses");
    let (_, last_page) = *pages(&document).last().expect("at least one page");
    let content = document.get_page_content(last_page).expect("page content");
    let operations = Content::decode(&content).expect("content decodes").operations;

    let blue = operations.iter().any(|operation| {
        operation.operator == "RG"
            && operation.operands.len() == 3
            && operation
                .operands
                .iter()
                .zip(CALLOUT_BLUE)
                .all(|(operand, expected)| {
                    number(operand).map_or(false, |value| (value - expected).abs() < 0.01)
                })
    });
    assert!(blue, "no stroke in #2c5f8d on the last page");

    // Two 15 pt paddings plus at least one 10 pt line.
    let heights: Vec<f32> = operations
        .iter()
        .filter(|operation| operation.operator == "m")
        .filter_map(|operation| operation.operands.get(1).and_then(number))
        .collect();
    assert!(heights.len() >= 40, "only {} fill strokes", heights.len());
    let top = heights.iter().copied().fold(f32::MIN, f32::max);
    let bottom = heights.iter().copied().fold(f32::MAX, f32::min);
    assert!(top - bottom >= 38.0, "fill spans {} pt", top - bottom);
}

#[test]
fn heading_pushed_to_next_page_is_bookmarked_there() {
    if !fonts_ready("heading_pushed_to_next_page") {
        return;
    }

    for filler_mm in [236.0, 243.0, 250.0, 256.0] {
        let mut story = Story::new();
        story
            .spacer_cm(filler_mm / 10.0)
            .text(StyleRole::Heading, "ZZHEAD")
            .expect("valid markup");
        let pdf = PdfBuilder::new(story).render().expect("render story");

        let document = Document::load_mem(&pdf.bytes).expect("pdf parses");
        let printed_on: Vec<usize> = page_texts(&document)
            .iter()
            .enumerate()
            .filter(|(_, text)| text.contains("ZZHEAD"))
            .map(|(index, _)| index + 1)
            .collect();
        assert_eq!(printed_on.len(), 1, "filler {filler_mm} mm");
        assert_eq!(
            pdf.bookmarks[0].page_number, printed_on[0],
            "filler {filler_mm} mm"
        );
    }
}

#[test]
fn outline_lists_sections_in_order() {
    let Some(pdf) = render("outline_lists_sections", GenerateOptions::default()) else {
        return;
    };

    let expected = [
        "1. Les Risques Professionnels",
        "2. Les Mesures de Prévention",
        "3. Le Rôle de l'Entreprise et du Travailleur",
        "Conclusion",
    ];
    let titles: Vec<&str> = pdf.bookmarks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, expected);
    let pages: Vec<usize> = pdf.bookmarks.iter().map(|b| b.page_number).collect();
    assert!(pages[0] < pages[1] && pages[1] < pages[2] && pages[2] <= pages[3]);
    assert_eq!(pages[0], 2);

    let document = Document::load_mem(&pdf.bytes).expect("pdf parses");
    let encoded: Vec<Vec<u8>> = expected
        .iter()
        .map(|title| string_bytes(text_string(title)))
        .collect();
    assert_eq!(outline_titles(&document), encoded);

    let outline_roots = document
        .objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter(|dict| {
            dict.get(b"Type")
                .and_then(Object::as_name)
                .map(|name| name == b"Outlines")
                .unwrap_or(false)
        })
        .count();
    assert_eq!(outline_roots, 1);
}

#[test]
fn metadata_is_written_as_text_strings() {
    let Some(pdf) = render("metadata_text_strings", GenerateOptions::default()) else {
        return;
    };
    let document = Document::load_mem(&pdf.bytes).expect("pdf parses");
    let author = info(&document)
        .expect("info dictionary")
        .get(b"Author")
        .and_then(Object::as_str)
        .expect("author entry");
    assert_eq!(author, string_bytes(text_string("Guide Éducatif")).as_slice());
}

#[test]
fn outline_can_be_disabled() {
    let Some(pdf) = render("outline_can_be_disabled", GenerateOptions { outline: false }) else {
        return;
    };
    let document = Document::load_mem(&pdf.bytes).expect("pdf parses");

    assert!(outline_titles(&document).is_empty());
    if let Ok(root) = catalog(&document)
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .and_then(|id| document.get_dictionary(id))
    {
        assert!(root.get(b"First").is_err());
        let count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        assert_eq!(count, 0);
    }
    assert!(info(&document).map_or(true, |info| info.get(b"Author").is_err()));
    assert_eq!(pdf.bookmarks.len(), 4);
}

#[test]
fn writes_exactly_one_file_with_expected_name() {
    if !fonts_ready("writes_exactly_one_file") {
        return;
    }
    let dir = tempfile::tempdir().expect("create temp dir");
    let target = dir.path().join(OUTPUT_FILENAME);

    let written = brochure::generate_document_to(&target, GenerateOptions::default())
        .expect("generate brochure");
    assert_eq!(written, target);

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read temp dir")
        .collect::<Result<_, _>>()
        .expect("list entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_name(), OUTPUT_FILENAME);
}

#[test]
fn rendering_is_deterministic() {
    let Some(first) = render("rendering_is_deterministic", GenerateOptions::default()) else {
        return;
    };
    let Some(second) = render("rendering_is_deterministic", GenerateOptions::default()) else {
        return;
    };

    assert_eq!(first.bytes.len(), second.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&first.bytes),
        normalized_hash(&second.bytes),
        "renders must match once dates and IDs are blanked"
    );
}
