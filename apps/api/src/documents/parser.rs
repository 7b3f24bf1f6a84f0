//! Document Parser — turns an uploaded PDF or TXT payload into cleaned plain text.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline pattern is valid"));
static EXCESS_SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x0B\x0C]{2,}").expect("space pattern is valid"));

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Only PDF and TXT files are supported (got '{0}')")]
    UnsupportedType(String),

    #[error("Uploaded file has no name")]
    MissingFileName,

    #[error("File size {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Document contains no extractable text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Txt,
}

impl FileType {
    /// Resolves the type from a file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self, DocumentError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(FileType::Pdf),
            "txt" => Ok(FileType::Txt),
            other => Err(DocumentError::UnsupportedType(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Txt => "txt",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    #[serde(skip)]
    pub text: String,
    pub file_name: String,
    pub file_type: FileType,
    pub word_count: usize,
}

/// Checks type and size before anything is written or parsed.
pub fn validate_upload(
    file_name: &str,
    size: usize,
    max_size: usize,
) -> Result<FileType, DocumentError> {
    let file_type = FileType::from_file_name(file_name)?;
    if size > max_size {
        return Err(DocumentError::TooLarge {
            size,
            limit: max_size,
        });
    }
    Ok(file_type)
}

/// Extracts and cleans text. PDF extraction runs on the blocking pool.
pub async fn parse_document(
    file_name: &str,
    file_type: FileType,
    data: bytes::Bytes,
) -> Result<ParsedDocument, DocumentError> {
    let raw = match file_type {
        FileType::Txt => String::from_utf8_lossy(&data).into_owned(),
        FileType::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).map_err(|e| DocumentError::Pdf(e.to_string()))
        })
        .await
        .map_err(|e| DocumentError::Pdf(e.to_string()))??,
    };

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(DocumentError::Empty);
    }

    Ok(ParsedDocument {
        word_count: text.split_whitespace().count(),
        text,
        file_name: file_name.to_string(),
        file_type,
    })
}

/// Normalizes line endings and collapses runs of blank lines and spaces.
pub fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = EXCESS_NEWLINES_RE.replace_all(&text, "\n\n");
    let text = text.replace('\t', " ");
    let text = EXCESS_SPACES_RE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_file_name("resume.PDF").unwrap(), FileType::Pdf);
        assert_eq!(FileType::from_file_name("jd.txt").unwrap(), FileType::Txt);
        assert!(matches!(
            FileType::from_file_name("resume.docx"),
            Err(DocumentError::UnsupportedType(ext)) if ext == "docx"
        ));
        assert!(FileType::from_file_name("README").is_err());
    }

    #[test]
    fn test_validate_upload_enforces_size() {
        assert!(validate_upload("a.txt", 10, 10).is_ok());
        assert!(matches!(
            validate_upload("a.txt", 11, 10),
            Err(DocumentError::TooLarge { size: 11, limit: 10 })
        ));
    }

    #[test]
    fn test_clean_text() {
        let raw = "Jane\r\nDoe\n\n\n\nSkills:\tRust    Go\n";
        assert_eq!(clean_text(raw), "Jane\nDoe\n\nSkills: Rust Go");
    }

    #[test]
    fn test_clean_text_keeps_paragraph_breaks() {
        assert_eq!(clean_text("a\n\nb"), "a\n\nb");
    }

    #[tokio::test]
    async fn test_parse_txt_document() {
        let data = bytes::Bytes::from_static(b"  5 years of experience\r\nin React  ");
        let parsed = parse_document("resume.txt", FileType::Txt, data).await.unwrap();
        assert_eq!(parsed.text, "5 years of experience\nin React");
        assert_eq!(parsed.word_count, 6);
        assert_eq!(parsed.file_type, FileType::Txt);
    }

    #[tokio::test]
    async fn test_blank_txt_document_is_rejected() {
        let data = bytes::Bytes::from_static(b" \n\n ");
        assert!(matches!(
            parse_document("blank.txt", FileType::Txt, data).await,
            Err(DocumentError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_garbage_pdf_fails_cleanly() {
        let data = bytes::Bytes::from_static(b"not a pdf");
        assert!(matches!(
            parse_document("resume.pdf", FileType::Pdf, data).await,
            Err(DocumentError::Pdf(_))
        ));
    }
}
