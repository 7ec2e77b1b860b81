//! Text extraction from resume files.
//!
//! The parser only ever sees the concatenated plain text produced here;
//! file-format handling stops at this module boundary.

use std::path::Path;

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use tracing::debug;

use crate::error::{Error, Result};

/// Extract the full text of a resume file, dispatching on the extension.
/// Unrecognized extensions are a fatal error for that file.
pub fn extract_text(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => extract_pdf_text(path),
        "docx" | "doc" => extract_docx_text(path),
        other => Err(Error::UnsupportedFormat(format!(
            "{}: .{other}",
            path.display()
        ))),
    }
}

fn extract_pdf_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| Error::Extraction(format!("{}: {e}", path.display())))?;
    debug!("extracted {} characters from {}", text.len(), path.display());
    Ok(text)
}

/// Paragraph text only, one line per paragraph, matching what the parser's
/// line-oriented heuristics expect.
fn extract_docx_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let docx = read_docx(&bytes)
        .map_err(|e| Error::Extraction(format!("{}: {e}", path.display())))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for para_child in &paragraph.children {
                if let ParagraphChild::Run(run) = para_child {
                    for run_child in &run.children {
                        if let RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    debug!("extracted {} characters from {}", text.len(), path.display());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let err = extract_text(Path::new("resume.txt")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let err = extract_text(Path::new("resume")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        // A .PDF path gets past the dispatch and fails on the missing file
        // instead of the extension.
        let err = extract_text(Path::new("no-such-file.PDF")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
