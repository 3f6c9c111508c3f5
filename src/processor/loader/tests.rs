use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>  Rust Ownership </title>
    <meta name="description" content="A short guide to ownership">
    <style>body { color: red; }</style>
</head>
<body>
    <h1>Ownership</h1>
    <p>Each value has a single   owner.</p>
    <script>console.log("hidden");</script>
    <noscript>Enable JavaScript</noscript>
    <ul><li>Move</li><li>Borrow</li></ul>
</body>
</html>"#;

#[test]
fn text_file_becomes_one_document() {
    let mut file = NamedTempFile::new().expect("should create temp file");
    write!(file, "line one\nline two").expect("should write temp file");

    let document = load_text_file(file.path(), "notes.txt").expect("should load text");
    assert_eq!(document.content, "line one\nline two");
    assert_eq!(document.metadata, DocumentMetadata::new("notes.txt"));
}

#[test]
fn invalid_utf8_text_is_an_io_error() {
    let mut file = NamedTempFile::new().expect("should create temp file");
    file.write_all(&[0xff, 0xfe, 0x00, 0xc3])
        .expect("should write temp file");

    let result = load_text_file(file.path(), "binary.txt");
    assert!(matches!(result, Err(RagError::Io(_))));
}

#[test]
fn corrupt_pdf_is_a_parse_error() {
    let mut file = NamedTempFile::new().expect("should create temp file");
    write!(file, "definitely not a pdf").expect("should write temp file");

    let result = load_pdf_file(file.path(), "broken.pdf");
    match result {
        Err(RagError::Parse { origin, .. }) => assert_eq!(origin, "broken.pdf"),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn page_text_excludes_hidden_elements() {
    let document = extract_page(SAMPLE_PAGE, "https://example.com/ownership")
        .expect("should extract page");

    assert_eq!(
        document.content,
        "Ownership\nEach value has a single owner.\nMove\nBorrow"
    );
    assert!(!document.content.contains("hidden"));
    assert!(!document.content.contains("color: red"));
}

#[test]
fn page_metadata_is_collected() {
    let document = extract_page(SAMPLE_PAGE, "https://example.com/ownership")
        .expect("should extract page");

    assert_eq!(document.metadata.source, "https://example.com/ownership");
    assert_eq!(document.metadata.title.as_deref(), Some("Rust Ownership"));
    assert_eq!(
        document.metadata.description.as_deref(),
        Some("A short guide to ownership")
    );
    assert_eq!(document.metadata.language.as_deref(), Some("en"));
}

#[test]
fn fragment_without_metadata() {
    let document =
        extract_page("<p>Just a paragraph</p>", "https://example.com").expect("should extract");

    assert_eq!(document.content, "Just a paragraph");
    assert_eq!(document.metadata.title, None);
    assert_eq!(document.metadata.description, None);
    assert_eq!(document.metadata.language, None);
}

#[test]
fn metadata_serialization_skips_missing_fields() {
    let metadata = DocumentMetadata::new("a.txt");
    let json = serde_json::to_value(&metadata).expect("should serialize metadata");
    assert_eq!(json, serde_json::json!({ "source": "a.txt" }));
}
