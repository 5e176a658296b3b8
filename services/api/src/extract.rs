//! services/api/src/extract.rs
//!
//! Text extraction for uploaded documents, dispatched by MIME type.
//! Only the extracted text ever reaches storage; the original file bytes are
//! discarded after this step.

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("file is not valid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("could not read PDF: {0}")]
    Pdf(String),
    #[error("could not read DOCX: {0}")]
    Docx(String),
}

/// Extracts plain text from an uploaded file's bytes.
///
/// Supported types: PDF, DOCX, and plain text. Anything else fails with
/// [`ExtractError::UnsupportedFormat`].
pub fn extract_text(mime_type: &str, data: &[u8]) -> Result<String, ExtractError> {
    match mime_type {
        "application/pdf" => {
            pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractError::Pdf(e.to_string()))
        }
        DOCX_MIME => extract_docx_text(data),
        "text/plain" => Ok(String::from_utf8(data.to_vec())?),
        other => Err(ExtractError::UnsupportedFormat(other.to_string())),
    }
}

/// Walks the DOCX document tree collecting run text, one line per paragraph.
fn extract_docx_text(data: &[u8]) -> Result<String, ExtractError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(data).map_err(|e| ExtractError::Docx(format!("{e:?}")))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for paragraph_child in &paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in &run.children {
                        if let RunChild::Text(text) = run_child {
                            line.push_str(&text.text);
                        }
                    }
                }
            }
            lines.push(line);
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = extract_text("text/plain", b"hello quiz").unwrap();
        assert_eq!(text, "hello quiz");
    }

    #[test]
    fn plain_text_must_be_utf8() {
        let err = extract_text("text/plain", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUtf8(_)));
    }

    #[test]
    fn unknown_mime_types_are_unsupported() {
        let err = extract_text("image/png", &[]).unwrap_err();
        match err {
            ExtractError::UnsupportedFormat(mime) => assert_eq!(mime, "image/png"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
