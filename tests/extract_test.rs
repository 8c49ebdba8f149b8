// tests/extract_test.rs — .docx extraction against real archive layouts

mod common;

use docqa::infra::errors::ExtractError;
use docqa::integrations::msoffice::{read_docx, read_document, DocumentFormat};
use pretty_assertions::assert_eq;

#[test]
fn test_n_paragraphs_give_n_lines_in_order() {
    let paragraphs = ["First line", "", "Third & last <ok>"];
    let bytes = common::docx_from_paragraphs(&paragraphs);

    let text = read_docx(&bytes).unwrap();
    assert_eq!(text, "First line\n\nThird & last <ok>\n");
    assert_eq!(text.matches('\n').count(), paragraphs.len());
}

#[test]
fn test_many_paragraphs() {
    let lines: Vec<String> = (0..200).map(|i| format!("Paragraph {i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let text = read_docx(&common::docx_from_paragraphs(&refs)).unwrap();
    let got: Vec<&str> = text.lines().collect();
    assert_eq!(got, refs);
}

#[test]
fn test_empty_document() {
    let text = read_docx(&common::docx_from_paragraphs(&[])).unwrap();
    assert_eq!(text, "");
}

#[test]
fn test_runs_with_formatting_are_joined() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r><w:r><w:t xml:space="preserve"> and plain</w:t></w:r></w:p>
</w:body>
</w:document>"#;
    let text = read_docx(&common::docx_with_document_xml(xml)).unwrap();
    assert_eq!(text, "Bold and plain\n");
}

#[test]
fn test_missing_document_part() {
    let bytes = common::zip_with(&[
        ("[Content_Types].xml", common::CONTENT_TYPES_XML),
        ("word/Document.xml", "<w:document/>"),
    ]);
    assert!(matches!(read_docx(&bytes), Err(ExtractError::MissingPart)));
}

#[test]
fn test_corrupt_archive() {
    let mut bytes = common::docx_from_paragraphs(&["hello"]);
    bytes.truncate(bytes.len() / 2);
    assert!(matches!(read_docx(&bytes), Err(ExtractError::CorruptArchive(_))));

    assert!(matches!(read_docx(b""), Err(ExtractError::CorruptArchive(_))));
}

#[test]
fn test_malformed_document_part() {
    let bytes = common::docx_with_document_xml("<w:document><w:body><w:p><w:r><w:t>oops</w:r></w:p>");
    assert!(matches!(read_docx(&bytes), Err(ExtractError::MalformedXml(_))));
}

#[test]
fn test_dispatch_by_file_name() {
    let docx = common::docx_from_paragraphs(&["from docx"]);
    let format = DocumentFormat::from_file_name("Report.Docx").unwrap();
    assert_eq!(read_document(format, &docx).unwrap(), "from docx\n");

    let format = DocumentFormat::from_file_name("test.txt").unwrap();
    assert_eq!(
        read_document(format, b"Paris is the capital of France.\n").unwrap(),
        "Paris is the capital of France.\n"
    );
}
