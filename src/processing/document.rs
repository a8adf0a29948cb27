//! Document structures

use crate::processing::text_processor::TextProcessor;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Resume,
    JobDescription,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Resume => write!(f, "resume"),
            DocumentType::JobDescription => write!(f, "job description"),
        }
    }
}

/// A piece of text taking part in one analysis. Tokens are computed on first use.
#[derive(Debug, Clone)]
pub struct Document {
    content: String,
    document_type: DocumentType,
    tokens: OnceCell<Vec<String>>,
}

impl Document {
    pub fn new(content: impl Into<String>, document_type: DocumentType) -> Self {
        Self {
            content: content.into(),
            document_type,
            tokens: OnceCell::new(),
        }
    }

    pub fn resume(content: impl Into<String>) -> Self {
        Self::new(content, DocumentType::Resume)
    }

    pub fn job_description(content: impl Into<String>) -> Self {
        Self::new(content, DocumentType::JobDescription)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn tokens(&self, processor: &TextProcessor) -> &[String] {
        self.tokens.get_or_init(|| processor.normalize(&self.content))
    }

    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }
}
