// src/integrations/msoffice.rs — Document text extraction (.docx and .txt)
//
// .docx files are ZIP archives containing XML; we parse word/document.xml.
// Only text sitting at document > body > p > r > t is collected. Tables,
// headers, footnotes and nested structures are skipped.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

use crate::infra::errors::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Formats accepted for upload, chosen by file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    WordDocument,
}

impl DocumentFormat {
    /// Case-insensitive `.txt` / `.docx` suffix match.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".txt") {
            Some(Self::PlainText)
        } else if lower.ends_with(".docx") {
            Some(Self::WordDocument)
        } else {
            None
        }
    }
}

/// Turn uploaded bytes into document text.
pub fn read_document(format: DocumentFormat, bytes: &[u8]) -> Result<String, ExtractError> {
    match format {
        DocumentFormat::PlainText => Ok(read_plain_text(bytes)),
        DocumentFormat::WordDocument => read_docx(bytes),
    }
}

/// Plain text is taken as-is. Invalid UTF-8 sequences become U+FFFD.
pub fn read_plain_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Extract paragraph text from a .docx archive held in memory.
pub fn read_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::CorruptArchive(e.to_string()))?;

    let mut xml = Vec::new();
    {
        let mut entry = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => ExtractError::MissingPart,
            other => ExtractError::CorruptArchive(other.to_string()),
        })?;
        entry
            .read_to_end(&mut xml)
            .map_err(|e| ExtractError::CorruptArchive(e.to_string()))?;
    }

    Ok(parse_document_xml(&xml)?.text())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
}

impl ParsedDocument {
    /// Each paragraph's runs concatenated, followed by a newline.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for paragraph in &self.paragraphs {
            for run in &paragraph.runs {
                out.push_str(&run.text);
            }
            out.push('\n');
        }
        out
    }
}

/// Local element names along the collected path, below the root.
const TEXT_PATH: [&[u8]; 4] = [b"body", b"p", b"r", b"t"];

/// Parse the main document part into paragraphs and runs.
///
/// Element names are matched by local name, so any namespace prefix works.
/// Only direct children along the path count: a `p` inside a table cell is
/// not a body paragraph.
pub fn parse_document_xml(xml: &[u8]) -> Result<ParsedDocument, ExtractError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().check_end_names = true;

    let mut doc = ParsedDocument::default();
    // Per open element: whether it lies on the root > body > p > r > t path.
    let mut stack: Vec<bool> = Vec::new();
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(&reader, e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if stack.is_empty() {
                    if seen_root {
                        return Err(ExtractError::MalformedXml(
                            "multiple root elements".into(),
                        ));
                    }
                    seen_root = true;
                    stack.push(true);
                } else {
                    let depth = stack.len();
                    let parent_on_path = stack.last().copied().unwrap_or(false);
                    let on_path = parent_on_path
                        && TEXT_PATH.get(depth - 1) == Some(&e.local_name().as_ref());
                    if on_path {
                        open_on_path(&mut doc, depth);
                    }
                    stack.push(on_path);
                }
                if matches!(event, Event::Empty(_)) {
                    stack.pop();
                }
            }
            Event::End(_) => {
                stack.pop();
                if stack.is_empty() {
                    break;
                }
            }
            Event::Text(ref t) => {
                if in_text(&stack) {
                    push_text(&mut doc, decode(t)?);
                }
            }
            Event::CData(ref t) => {
                if in_text(&stack) {
                    push_text(&mut doc, decode(t)?);
                }
            }
            Event::GeneralRef(ref r) => {
                if in_text(&stack) {
                    let resolved = resolve_reference(decode(r)?)?;
                    push_text(&mut doc, &resolved);
                }
            }
            Event::Eof => {
                if !seen_root {
                    return Err(ExtractError::MalformedXml("no root element".into()));
                }
                if !stack.is_empty() {
                    return Err(ExtractError::MalformedXml(
                        "unexpected end of document".into(),
                    ));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(doc)
}

fn malformed(reader: &Reader<&[u8]>, err: quick_xml::Error) -> ExtractError {
    ExtractError::MalformedXml(format!(
        "at byte {}: {}",
        reader.error_position(),
        err
    ))
}

fn in_text(stack: &[bool]) -> bool {
    stack.len() == 5 && stack[4]
}

fn open_on_path(doc: &mut ParsedDocument, depth: usize) {
    match depth {
        2 => doc.paragraphs.push(Paragraph::default()),
        3 => {
            if let Some(paragraph) = doc.paragraphs.last_mut() {
                paragraph.runs.push(Run::default());
            }
        }
        _ => {}
    }
}

fn push_text(doc: &mut ParsedDocument, text: &str) {
    if let Some(run) = doc
        .paragraphs
        .last_mut()
        .and_then(|p| p.runs.last_mut())
    {
        run.text.push_str(text);
    }
}

fn decode(bytes: &[u8]) -> Result<&str, ExtractError> {
    std::str::from_utf8(bytes).map_err(|e| ExtractError::MalformedXml(e.to_string()))
}

/// Resolve `&name;` (given as `name`): character references and the five
/// predefined XML entities.
fn resolve_reference(name: &str) -> Result<String, ExtractError> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => num.parse::<u32>(),
        }
        .map_err(|_| ExtractError::MalformedXml(format!("bad character reference &{name};")))?;
        return char::from_u32(code)
            .filter(|&c| is_xml_char(c))
            .map(String::from)
            .ok_or_else(|| ExtractError::MalformedXml(format!("bad character reference &{name};")));
    }

    quick_xml::escape::resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| ExtractError::MalformedXml(format!("unknown entity &{name};")))
}

/// The `Char` production of XML 1.0. NUL and most C0 controls are excluded.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}
