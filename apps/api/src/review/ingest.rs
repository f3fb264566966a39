//! Document intake — turns an uploaded file into the text the pipeline reviews.
//!
//! Only plain-text formats are read here. Binary formats (PDF, DOCX) are
//! reported as unsupported so callers can surface a clear error.

use bytes::Bytes;
use thiserror::Error;

/// Default upload ceiling, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;

const TEXT_EXTENSIONS: [&str; 3] = ["txt", "text", "md"];

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Unsupported file format: {0}. Please upload a plain-text (.txt or .md) file.")]
    UnsupportedFormat(String),

    #[error("No text content found in the uploaded file.")]
    EmptyContent,

    #[error("File is larger than the {limit_mb} MB limit.")]
    TooLarge { limit_mb: usize },

    #[error("File is not valid UTF-8 text: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

/// An uploaded document before text extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub content: Bytes,
}

impl Document {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Lowercased extension after the last dot, or empty.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Produces `(name, text)` from a document. Text is guaranteed non-empty.
pub trait TextExtractionAdapter: Send + Sync {
    fn process(&self, document: &Document) -> Result<(String, String), AdapterError>;
}

/// Reads UTF-8 plain-text documents.
#[derive(Debug, Clone)]
pub struct PlainTextAdapter {
    max_bytes: usize,
}

impl PlainTextAdapter {
    pub fn new(max_upload_mb: usize) -> Self {
        Self {
            max_bytes: max_upload_mb * 1024 * 1024,
        }
    }
}

impl Default for PlainTextAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_MB)
    }
}

impl TextExtractionAdapter for PlainTextAdapter {
    fn process(&self, document: &Document) -> Result<(String, String), AdapterError> {
        let extension = document.extension();
        if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AdapterError::UnsupportedFormat(extension));
        }
        if document.content.len() > self.max_bytes {
            return Err(AdapterError::TooLarge {
                limit_mb: self.max_bytes / (1024 * 1024),
            });
        }

        let text = std::str::from_utf8(&document.content)?.trim();
        if text.is_empty() {
            return Err(AdapterError::EmptyContent);
        }
        Ok((document.file_name.clone(), text.to_string()))
    }
}
