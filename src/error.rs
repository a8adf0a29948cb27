//! Error handling for the resume scanner

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Insufficient content: {0}")]
    InsufficientContent(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Vector dimensions don't match: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Document is encrypted: {0}")]
    EncryptedDocument(String),

    #[error("Document is empty: {0}")]
    EmptyDocument(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Convert anyhow errors (model2vec-rs) to our custom error type
impl From<anyhow::Error> for ScanError {
    fn from(err: anyhow::Error) -> Self {
        ScanError::AnalysisFailed(format!("{:#}", err))
    }
}

/// Failure classes surfaced by the match orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientContent,
    ResourceExhausted,
    DimensionMismatch,
    UnknownFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::InsufficientContent => "insufficient content",
            FailureKind::ResourceExhausted => "resource exhausted",
            FailureKind::DimensionMismatch => "dimension mismatch",
            FailureKind::UnknownFailure => "unknown failure",
        };
        write!(f, "{}", name)
    }
}

impl ScanError {
    /// Classify this error for the presentation layer
    pub fn kind(&self) -> FailureKind {
        match self {
            ScanError::InsufficientContent(_) | ScanError::EmptyDocument(_) => {
                FailureKind::InsufficientContent
            }
            ScanError::ResourceExhausted(_) => FailureKind::ResourceExhausted,
            ScanError::DimensionMismatch { .. } => FailureKind::DimensionMismatch,
            _ => FailureKind::UnknownFailure,
        }
    }

    /// User-facing message describing what to do about the failure
    pub fn user_message(&self) -> String {
        match self {
            ScanError::EncryptedDocument(detail) => format!(
                "{}. Remove the password protection (export an unprotected copy) and try again.",
                detail
            ),
            ScanError::EmptyDocument(detail) => format!(
                "{}. If it is a scanned image, export it with selectable text or provide a .txt copy.",
                detail
            ),
            ScanError::PdfExtraction(detail) => format!(
                "Could not read the PDF ({}). Re-save it as a standard PDF or provide a .txt or .md copy.",
                detail
            ),
            ScanError::UnsupportedFormat(detail) => {
                format!("{}. Convert the file to PDF, plain text or Markdown.", detail)
            }
            _ => self.kind_message(),
        }
    }

    fn kind_message(&self) -> String {
        match self.kind() {
            FailureKind::InsufficientContent => {
                "Not enough meaningful text to analyze. Please provide a longer, more detailed job description and resume.".to_string()
            }
            FailureKind::ResourceExhausted => {
                "The semantic model ran out of resources while encoding. Try a shorter resume or job description, or use lexical mode.".to_string()
            }
            FailureKind::DimensionMismatch => {
                "An internal error occurred while comparing documents. Please report this issue.".to_string()
            }
            FailureKind::UnknownFailure => format!("Analysis failed: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ScanError::InsufficientContent("empty".into()).kind(),
            FailureKind::InsufficientContent
        );
        assert_eq!(
            ScanError::ResourceExhausted("too long".into()).kind(),
            FailureKind::ResourceExhausted
        );
        assert_eq!(
            ScanError::DimensionMismatch { left: 3, right: 4 }.kind(),
            FailureKind::DimensionMismatch
        );
        assert_eq!(
            ScanError::Embedding("boom".into()).kind(),
            FailureKind::UnknownFailure
        );
    }

    #[test]
    fn test_unknown_failure_keeps_detail() {
        let err = ScanError::ModelError("tokenizer.json missing".into());
        assert!(err.user_message().contains("tokenizer.json missing"));
    }

    #[test]
    fn test_input_errors_have_specific_messages() {
        let encrypted = ScanError::EncryptedDocument("'cv.pdf' is password protected".into());
        assert!(encrypted.user_message().contains("export an unprotected copy"));
        assert!(encrypted.user_message().contains("cv.pdf"));

        let unsupported = ScanError::UnsupportedFormat("Unsupported file type for: cv.docx".into());
        assert!(unsupported.user_message().contains("Convert the file"));

        let broken = ScanError::PdfExtraction("bad xref".into());
        assert!(broken.user_message().contains("bad xref"));
        assert!(!broken.user_message().starts_with("Analysis failed"));

        let empty = ScanError::EmptyDocument("'scan.pdf' contains no extractable text".into());
        assert_eq!(empty.kind(), FailureKind::InsufficientContent);
        assert!(empty.user_message().contains("selectable text"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: ScanError = anyhow::anyhow!("hub unreachable").into();
        assert_eq!(err.kind(), FailureKind::UnknownFailure);
        assert!(err.to_string().contains("hub unreachable"));
    }
}
