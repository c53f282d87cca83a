//! Rendering extracted text into downloadable files.
//!
//! Two formats are supported: plain UTF-8 text and DOCX. Anything that is not `"docx"` is treated
//! as plain text.

use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Used when the client gives no filename, or one that is nothing but an extension.
pub const DEFAULT_BASE_FILENAME: &str = "extracted_text";

pub const DOCX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Characters left unescaped in an RFC 5987 `filename*` value (`attr-char`).
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Txt,
    Docx,
}

impl ExportFormat {
    /// Parse a client-supplied format. Unrecognized values fall back to plain text.
    pub fn parse(value: &str) -> Self {
        match value {
            "docx" => ExportFormat::Docx,
            _ => ExportFormat::Txt,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => TXT_CONTENT_TYPE,
            ExportFormat::Docx => DOCX_CONTENT_TYPE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write DOCX document: {0}")]
    Docx(String),
}

/// A rendered file, ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// `Content-Disposition` value for this file.
    pub fn content_disposition(&self) -> String {
        content_disposition(&self.filename)
    }
}

/// Render `text` in `format`, naming the result after `filename` with its extension replaced.
pub fn export(text: &str, filename: &str, format: ExportFormat) -> Result<ExportedFile, ExportError> {
    let bytes = match format {
        ExportFormat::Txt => text.as_bytes().to_vec(),
        ExportFormat::Docx => render_docx(text)?,
    };

    Ok(ExportedFile {
        filename: format!("{}.{}", base_filename(filename), format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

/// Strip the last extension from `filename`. An empty result falls back to [`DEFAULT_BASE_FILENAME`].
pub fn base_filename(filename: &str) -> &str {
    let base = filename.rsplit_once('.').map_or(filename, |(base, _)| base);
    if base.is_empty() { DEFAULT_BASE_FILENAME } else { base }
}

/// Blank-line separated blocks of `text`, trimmed, with blank blocks dropped.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

/// Write each paragraph of `text` as a DOCX paragraph. Single newlines inside a paragraph become line breaks.
fn render_docx(text: &str) -> Result<Vec<u8>, ExportError> {
    let docx = paragraphs(text).fold(Docx::new(), |docx, paragraph| {
        let mut run = Run::new();
        for (i, line) in paragraph.split('\n').enumerate() {
            if i > 0 {
                run = run.add_break(BreakType::TextWrapping);
            }
            run = run.add_text(line);
        }
        docx.add_paragraph(Paragraph::new().add_run(run))
    });

    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Build an `attachment` disposition. Names that are not plain printable ASCII get an ASCII
/// fallback plus an RFC 5987 `filename*` parameter carrying the real name.
pub fn content_disposition(filename: &str) -> String {
    if filename.chars().all(is_token_safe) {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .map(|c| if is_token_safe(c) { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}

/// Printable ASCII that can sit inside a quoted header parameter as-is.
fn is_token_safe(c: char) -> bool {
    c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    /// Paragraph texts of a packed DOCX, with line breaks read back as `\n`.
    fn docx_paragraphs(bytes: &[u8]) -> Vec<String> {
        let docx = docx_rs::read_docx(bytes).expect("valid docx");
        docx.document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(paragraph) => Some(paragraph),
                _ => None,
            })
            .map(|paragraph| {
                let mut text = String::new();
                for child in &paragraph.children {
                    if let ParagraphChild::Run(run) = child {
                        for run_child in &run.children {
                            match run_child {
                                RunChild::Text(t) => text.push_str(&t.text),
                                RunChild::Break(_) => text.push('\n'),
                                _ => {}
                            }
                        }
                    }
                }
                text
            })
            .collect()
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::parse("docx"), ExportFormat::Docx);
        assert_eq!(ExportFormat::parse("txt"), ExportFormat::Txt);
        assert_eq!(ExportFormat::parse("pdf"), ExportFormat::Txt);
        assert_eq!(ExportFormat::parse("DOCX"), ExportFormat::Txt);
        assert_eq!(ExportFormat::parse(""), ExportFormat::Txt);
    }

    #[test]
    fn test_base_filename() {
        assert_eq!(base_filename("report.pdf"), "report");
        assert_eq!(base_filename("archive.tar.gz"), "archive.tar");
        assert_eq!(base_filename("x"), "x");
        assert_eq!(base_filename(".pdf"), DEFAULT_BASE_FILENAME);
        assert_eq!(base_filename(""), DEFAULT_BASE_FILENAME);
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        let text = "  first  \n\nsecond\nstill second\n\n\n\n   \n\nthird";
        let parts: Vec<_> = paragraphs(text).collect();
        assert_eq!(parts, vec!["first", "second\nstill second", "third"]);
    }

    #[test]
    fn test_txt_export() {
        let file = export("hello", "x", ExportFormat::Txt).unwrap();

        assert_eq!(file.filename, "x.txt");
        assert_eq!(file.content_type, "text/plain; charset=utf-8");
        assert_eq!(String::from_utf8(file.bytes).unwrap(), "hello");
    }

    #[test]
    fn test_txt_export_keeps_text_verbatim() {
        let text = "Grüße\n\n  indented\n";
        let file = export(text, "notes.pdf", ExportFormat::Txt).unwrap();

        assert_eq!(file.filename, "notes.txt");
        assert_eq!(file.bytes, text.as_bytes());
    }

    #[test]
    fn test_docx_export_two_paragraphs() {
        let file = export("A\n\nB", "x.pdf", ExportFormat::Docx).unwrap();

        assert_eq!(file.filename, "x.docx");
        assert_eq!(file.content_type, DOCX_CONTENT_TYPE);
        // DOCX is a zip archive
        assert_eq!(&file.bytes[..2], b"PK");
        assert_eq!(docx_paragraphs(&file.bytes), vec!["A", "B"]);
    }

    #[test]
    fn test_docx_skips_blank_paragraphs_and_keeps_line_breaks() {
        let file = export("\n\nfirst line\nsecond line\n\n   \n\nlast", "doc", ExportFormat::Docx).unwrap();

        assert_eq!(docx_paragraphs(&file.bytes), vec!["first line\nsecond line", "last"]);
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(content_disposition("report.txt"), "attachment; filename=\"report.txt\"");
        assert_eq!(content_disposition("my report.txt"), "attachment; filename=\"my report.txt\"");
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        assert_eq!(
            content_disposition("résumé.txt"),
            "attachment; filename=\"r_sum_.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9.txt"
        );
    }

    #[test]
    fn test_content_disposition_quotes_escaped() {
        let value = content_disposition("a\"b.txt");
        assert!(value.starts_with("attachment; filename=\"a_b.txt\"; filename*=UTF-8''a%22b.txt"));
    }
}
