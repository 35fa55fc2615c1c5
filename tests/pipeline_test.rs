//! End-to-end tests: PDF bytes in, enriched JSON out.

mod common;

use common::{chapters_pdf, show, titled_pdf, PdfBuilder};
use lopdf::content::Operation;
use lopdf::{dictionary, Object};
use pdfstruct::{
    convert_batch, convert_bytes, convert_file, convert_reader, extract_runs, ConvertOptions,
    Error, ExtractionError, JsonFormat, NodeKind, PageSelection, ParagraphMerge, ParseOptions,
    PdfConverter, Pdfstruct, ReadingOrder, Role, StructureNode, Thresholds,
};
use serde_json::{json, Value};

fn scenario_options() -> ConvertOptions {
    ConvertOptions::new().with_thresholds(Thresholds::new(20.0, 18.0, 14.0))
}

fn kinds(node: &StructureNode) -> Vec<NodeKind> {
    node.children.iter().map(|child| child.kind).collect()
}

#[test]
fn test_title_with_body_text() {
    let doc = convert_bytes(&titled_pdf(), "https://example.com/", &scenario_options()).unwrap();

    assert_eq!(doc.source_url(), Some("https://example.com/"));
    assert_eq!(doc.element_count(), Some(2));
    assert_eq!(doc.generated_title(), Some("Title"));

    let root = doc.structure().unwrap();
    assert_eq!(kinds(&root), vec![NodeKind::Heading1]);
    let heading = &root.children[0];
    assert_eq!(heading.text(), "Title");
    assert_eq!(kinds(heading), vec![NodeKind::Paragraph]);
    assert_eq!(heading.children[0].text(), "Intro text. more.");
}

#[test]
fn test_json_shape() {
    let doc = convert_bytes(&titled_pdf(), "https://example.com/", &scenario_options()).unwrap();
    let value: Value = serde_json::from_str(&doc.to_json(JsonFormat::Compact).unwrap()).unwrap();

    assert_eq!(value["type"], json!("document"));
    assert_eq!(value["order"], json!(0));
    assert_eq!(value["children"][0]["type"], json!("heading1"));
    assert_eq!(value["children"][0]["order"], json!(1));
    assert_eq!(value["children"][0]["children"][0]["type"], json!("paragraph"));
    assert_eq!(value["children"][0]["children"][0]["order"], json!(2));
    // Leaves carry no children key; no page numbers unless asked for
    assert!(value["children"][0]["children"][0].get("children").is_none());
    assert!(value["children"][0].get("page").is_none());
}

#[test]
fn test_sibling_chapters() {
    let pdf = PdfBuilder::new()
        .page(&[
            show("F2", 24, 72, 760, "A"),
            show("F1", 12, 72, 730, "x"),
            show("F2", 24, 72, 700, "B"),
            show("F1", 12, 72, 680, "y"),
        ])
        .build();
    let doc = convert_bytes(&pdf, "", &scenario_options()).unwrap();
    let root = doc.structure().unwrap();

    assert_eq!(kinds(&root), vec![NodeKind::Heading1, NodeKind::Heading1]);
    assert_eq!(root.children[0].children[0].text(), "x");
    assert_eq!(root.children[1].children[0].text(), "y");
    assert_eq!(doc.element_count(), Some(4));
    assert_eq!(doc.generated_title(), Some("A"));
}

#[test]
fn test_page_without_text() {
    let pdf = PdfBuilder::new().blank_page().build();
    let doc = convert_bytes(&pdf, "", &ConvertOptions::default()).unwrap();

    assert!(doc.children().is_empty());
    assert_eq!(doc.element_count(), Some(0));
    assert_eq!(doc.generated_title(), Some("Untitled Document"));
}

#[test]
fn test_empty_base_url_omits_source_url() {
    let doc = convert_bytes(&titled_pdf(), "", &scenario_options()).unwrap();
    assert!(doc.source_url().is_none());
    assert!(doc.get("source_url").is_none());
}

#[test]
fn test_nested_levels_across_pages() {
    let doc = convert_bytes(&chapters_pdf(), "", &ConvertOptions::default()).unwrap();
    let root = doc.structure().unwrap();

    assert_eq!(kinds(&root), vec![NodeKind::Heading1, NodeKind::Heading1]);

    let first = &root.children[0];
    assert_eq!(first.text(), "Chapter One");
    assert_eq!(kinds(first), vec![NodeKind::Paragraph, NodeKind::Heading2]);
    assert_eq!(first.children[1].children[0].text(), "Details of A.");

    let second = &root.children[1];
    assert_eq!(kinds(second), vec![NodeKind::Heading3]);
    assert_eq!(second.children[0].text(), "Minor heading");
    assert_eq!(second.children[0].children[0].text(), "Closing words.");

    assert_eq!(doc.element_count(), Some(7));
    assert_eq!(doc.generated_title(), Some("Chapter One"));
}

#[test]
fn test_headings_only_contain_deeper_headings() {
    fn check(node: &StructureNode) {
        for child in &node.children {
            if let (Some(parent), Some(level)) = (node.level(), child.level()) {
                assert!(level > parent, "{:?} inside {:?}", child.kind, node.kind);
            }
            check(child);
        }
    }
    let doc = convert_bytes(&chapters_pdf(), "", &ConvertOptions::default()).unwrap();
    check(&doc.structure().unwrap());
}

#[test]
fn test_order_is_preorder() {
    let doc = convert_bytes(&chapters_pdf(), "", &ConvertOptions::default()).unwrap();
    let root = doc.structure().unwrap();
    let orders: Vec<usize> = root.iter().map(|node| node.order).collect();
    assert_eq!(orders, (0..orders.len()).collect::<Vec<_>>());
}

#[test]
fn test_page_numbers_on_request() {
    let options = ConvertOptions::new().with_page_numbers(true);
    let doc = convert_bytes(&chapters_pdf(), "", &options).unwrap();
    let root = doc.structure().unwrap();

    // Page indices are 0-based
    assert_eq!(root.children[0].page, 0);
    assert_eq!(root.children[1].page, 1);
    assert_eq!(doc.children()[1]["page"], json!(1));
}

#[test]
fn test_page_selection() {
    let options = ConvertOptions::new().with_pages(PageSelection::Pages(vec![2]));
    let doc = convert_bytes(&chapters_pdf(), "", &options).unwrap();
    let root = doc.structure().unwrap();

    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].text(), "Chapter Two");
}

#[test]
fn test_page_selection_out_of_range() {
    let options = ConvertOptions::new().with_pages(PageSelection::Range(1..=5));
    let err = convert_bytes(&chapters_pdf(), "", &options).unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::PageOutOfRange(5, 2))
    ));
}

#[test]
fn test_encrypted_without_password() {
    let pdf = PdfBuilder::new()
        .page(&[show("F1", 12, 72, 700, "Secret")])
        .encrypted()
        .build();

    let err = convert_bytes(&pdf, "", &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Extraction(ExtractionError::Encrypted)));
}

#[test]
fn test_encrypted_wrong_password() {
    let pdf = PdfBuilder::new()
        .page(&[show("F1", 12, 72, 700, "Secret")])
        .encrypted()
        .build();

    let options = ConvertOptions::new().with_password("wrong");
    let err = convert_bytes(&pdf, "", &options).unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::InvalidPassword)
    ));
}

#[test]
fn test_invalid_input() {
    let err = convert_bytes(b"<html>not a pdf</html>", "", &ConvertOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::UnknownFormat)
    ));
}

#[test]
fn test_extract_runs_in_stream_order() {
    let runs = extract_runs(&chapters_pdf(), &ParseOptions::default()).unwrap();
    let texts: Vec<&str> = runs.iter().map(|run| run.text()).collect();

    assert_eq!(
        texts,
        vec![
            "Chapter One",
            "Opening words.",
            "Section A",
            "Details of A.",
            "Chapter Two",
            "Minor heading",
            "Closing words.",
        ]
    );
    assert!(runs.windows(2).all(|w| w[0].sequence() < w[1].sequence()));
    assert_eq!(runs[0].page_index(), 0);
    assert_eq!(runs[4].page_index(), 1);
    assert!(runs[0].is_bold());
    assert!(!runs[1].is_bold());
    assert!((runs[0].font_size() - 26.0).abs() < 0.01);
}

#[test]
fn test_geometric_order() {
    // Painted bottom to top
    let pdf = PdfBuilder::new()
        .page(&[
            show("F1", 12, 72, 500, "last"),
            show("F1", 12, 72, 700, "first"),
        ])
        .build();

    let stream = extract_runs(&pdf, &ParseOptions::default()).unwrap();
    assert_eq!(stream[0].text(), "last");

    let options = ParseOptions::default().with_reading_order(ReadingOrder::Geometric);
    let geometric = extract_runs(&pdf, &options).unwrap();
    assert_eq!(geometric[0].text(), "first");
    assert_eq!(geometric[1].text(), "last");
    assert!(geometric[0].sequence() < geometric[1].sequence());
}

#[test]
fn test_text_matrix_scales_font_size() {
    let pdf = PdfBuilder::new()
        .raw_page(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 1.into()]),
            Operation::new(
                "Tm",
                vec![
                    30.into(),
                    0.into(),
                    0.into(),
                    30.into(),
                    72.into(),
                    700.into(),
                ],
            ),
            Operation::new("Tj", vec![Object::string_literal("Scaled")]),
            Operation::new("ET", vec![]),
        ])
        .build();

    let runs = extract_runs(&pdf, &ParseOptions::default()).unwrap();
    assert_eq!(runs.len(), 1);
    assert!((runs[0].font_size() - 30.0).abs() < 0.01);

    let doc = convert_bytes(&pdf, "", &ConvertOptions::default()).unwrap();
    assert_eq!(doc.generated_title(), Some("Scaled"));
}

#[test]
fn test_negative_font_size_is_mirrored() {
    let pdf = PdfBuilder::new()
        .page(&[
            show("F2", -30, 72, 700, "Mirrored Title"),
            show("F1", 12, 72, 660, "Body text."),
        ])
        .build();

    let runs = extract_runs(&pdf, &ParseOptions::default()).unwrap();
    assert!((runs[0].font_size() - 30.0).abs() < 0.01);

    let doc = convert_bytes(&pdf, "", &ConvertOptions::default()).unwrap();
    let root = doc.structure().unwrap();
    assert_eq!(kinds(&root), vec![NodeKind::Heading1]);
    assert_eq!(kinds(&root.children[0]), vec![NodeKind::Paragraph]);
    assert_eq!(doc.generated_title(), Some("Mirrored Title"));
}

#[test]
fn test_spans_on_one_line_merge() {
    let pdf = PdfBuilder::new()
        .raw_page(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("Hello ")]),
            Operation::new("Tj", vec![Object::string_literal("world")]),
            Operation::new("Tf", vec!["F2".into(), 12.into()]),
            Operation::new("Tj", vec![Object::string_literal(" bold")]),
            Operation::new("ET", vec![]),
        ])
        .build();

    let runs = extract_runs(&pdf, &ParseOptions::default()).unwrap();
    let texts: Vec<&str> = runs.iter().map(|run| run.text()).collect();
    assert_eq!(texts, vec!["Hello world", "bold"]);
    assert!(runs[1].is_bold());
}

#[test]
fn test_descriptor_flags_mark_bold() {
    let pdf = PdfBuilder::new()
        .page(&[show("F3", 12, 72, 700, "Notice"), show("F1", 12, 72, 680, "Body")])
        .build();

    let runs = extract_runs(&pdf, &ParseOptions::default()).unwrap();
    assert!(runs[0].is_bold());
    assert_eq!(runs[0].font_name(), "Corporate");

    let plain = PdfConverter::new(ConvertOptions::default()).unwrap();
    let roles: Vec<Role> = plain
        .classify_bytes(&pdf)
        .unwrap()
        .into_iter()
        .map(|(_, role)| role)
        .collect();
    assert_eq!(roles, vec![Role::Paragraph, Role::Paragraph]);

    let options = ConvertOptions::new()
        .with_thresholds(Thresholds::default().with_bold_implies_heading(true));
    let doc = convert_bytes(&pdf, "", &options).unwrap();
    let root = doc.structure().unwrap();
    assert_eq!(kinds(&root), vec![NodeKind::Emphasis, NodeKind::Paragraph]);
}

#[test]
fn test_paragraph_merge_within_block() {
    let options = scenario_options().with_paragraph_merge(ParagraphMerge::WithinBlock);
    let doc = convert_bytes(&titled_pdf(), "", &options).unwrap();
    let root = doc.structure().unwrap();

    // Each body line sits in its own text object
    let texts: Vec<&str> = root.children[0].children.iter().map(|n| n.text()).collect();
    assert_eq!(texts, vec!["Intro text.", "more."]);
    assert_eq!(doc.element_count(), Some(3));
}

#[test]
fn test_adaptive_thresholds() {
    // Body at 10pt gives bands at 15, 13 and 11.5
    let pdf = PdfBuilder::new()
        .page(&[
            show("F2", 18, 72, 760, "Big"),
            show("F1", 14, 72, 730, "Medium"),
            show("F1", 12, 72, 700, "Small"),
            show("F1", 10, 72, 680, "Body text that dominates the page."),
            show("F1", 10, 72, 666, "More body text to weigh the statistics."),
        ])
        .build();

    let fixed = convert_bytes(&pdf, "", &ConvertOptions::default()).unwrap();
    assert_eq!(fixed.generated_title(), Some("Untitled Document"));

    let result = Pdfstruct::new().adaptive().convert_bytes(&pdf).unwrap();
    assert!((result.thresholds.heading1_min_size - 15.0).abs() < 0.01);

    let root = result.document.structure().unwrap();
    assert_eq!(root.children[0].kind, NodeKind::Heading1);
    assert_eq!(root.children[0].children[0].kind, NodeKind::Heading2);
    assert_eq!(root.children[0].children[0].children[0].kind, NodeKind::Heading3);
    assert_eq!(result.document.generated_title(), Some("Big"));
}

#[test]
fn test_document_info() {
    let pdf = PdfBuilder::new()
        .info(dictionary! {
            "Title" => Object::string_literal("Quarterly Report"),
            "Author" => Object::string_literal("Finance"),
            "CreationDate" => Object::string_literal("D:20240115103000Z"),
        })
        .page(&[show("F1", 12, 72, 700, "Hello")])
        .build();

    let result = Pdfstruct::new().with_info().convert_bytes(&pdf).unwrap();
    assert_eq!(result.info.title.as_deref(), Some("Quarterly Report"));
    assert_eq!(result.info.page_count, 1);
    assert!(!result.info.encrypted);

    let info = result.document.get("pdf_info").unwrap();
    assert_eq!(info["title"], json!("Quarterly Report"));
    assert_eq!(info["author"], json!("Finance"));
    assert_eq!(info["page_count"], json!(1));
    assert!(info["created"].as_str().unwrap().starts_with("2024-01-15T10:30:00"));
}

#[test]
fn test_stats() {
    let result = Pdfstruct::new().convert_bytes(&chapters_pdf()).unwrap();
    let stats = result.stats;

    assert_eq!(stats.pages, 2);
    assert_eq!(stats.runs, 7);
    assert_eq!(stats.unknown_runs, 0);
    assert_eq!(stats.heading1, 2);
    assert_eq!(stats.heading2, 1);
    assert_eq!(stats.heading3, 1);
    assert_eq!(stats.paragraphs, 3);
    assert_eq!(stats.nodes() as u64, result.document.element_count().unwrap());
}

#[test]
fn test_convert_file_records_file_and_link() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, titled_pdf()).unwrap();

    let options = scenario_options().with_base_url("https://docs.example.com/library");
    let doc = convert_file(&path, &options).unwrap();

    assert_eq!(doc.get("file"), Some(&json!("report.pdf")));
    assert_eq!(
        doc.get("link"),
        Some(&json!("https://docs.example.com/library/report.pdf"))
    );
    assert_eq!(doc.generated_title(), Some("Title"));
}

#[test]
fn test_convert_reader() {
    let pdf = titled_pdf();
    let doc = convert_reader(std::io::Cursor::new(pdf), &scenario_options()).unwrap();
    assert_eq!(doc.generated_title(), Some("Title"));
    // Readers have no name
    assert!(doc.get("file").is_none());
}

#[test]
fn test_convert_batch_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    let missing = dir.path().join("missing.pdf");
    std::fs::write(&first, titled_pdf()).unwrap();
    std::fs::write(&second, chapters_pdf()).unwrap();

    let results = convert_batch(&[&first, &missing, &second], &scenario_options());
    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().unwrap().generated_title(),
        Some("Title")
    );
    assert!(matches!(results[1], Err(Error::Io(_))));
    assert_eq!(
        results[2].as_ref().unwrap().generated_title(),
        Some("Chapter One")
    );
}

#[test]
fn test_same_input_same_output() {
    let pdf = chapters_pdf();
    let a = convert_bytes(&pdf, "https://example.com/", &ConvertOptions::default()).unwrap();
    let b = convert_bytes(&pdf, "https://example.com/", &ConvertOptions::default()).unwrap();
    assert_eq!(
        a.to_json(JsonFormat::Compact).unwrap(),
        b.to_json(JsonFormat::Compact).unwrap()
    );
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_convert_file_async() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("async.pdf");
    std::fs::write(&path, titled_pdf()).unwrap();

    let doc = pdfstruct::convert_file_async(&path, &scenario_options())
        .await
        .unwrap();
    assert_eq!(doc.get("file"), Some(&json!("async.pdf")));
}
