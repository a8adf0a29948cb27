//! Text extraction from various file formats

use crate::error::{Result, ScanError};
use log::{debug, warn};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::path::Path;
use tokio::fs;

/// Pages of one PDF are joined with a blank line
pub const PAGE_SEPARATOR: &str = "\n\n";

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("Invalid HTML tag regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub pages: usize,
}

impl ExtractedText {
    fn single_page(text: String) -> Self {
        Self { text, pages: 1 }
    }
}

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<ExtractedText>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let bytes = fs::read(path).await?;
        Self::extract_from_mem(&bytes, &path.display().to_string())
    }
}

impl PdfExtractor {
    pub fn extract_from_mem(bytes: &[u8], name: &str) -> Result<ExtractedText> {
        if bytes.is_empty() {
            return Err(ScanError::EmptyDocument(format!("'{}' is an empty file", name)));
        }

        let doc = match lopdf::Document::load_mem(bytes) {
            Ok(doc) => doc,
            Err(_) if Self::declares_encryption(bytes) => {
                return Err(ScanError::EncryptedDocument(format!(
                    "'{}' is password protected",
                    name
                )));
            }
            Err(e) => {
                return Err(ScanError::PdfExtraction(format!("Failed to parse PDF '{}': {}", name, e)));
            }
        };

        if doc.is_encrypted() {
            return Err(ScanError::EncryptedDocument(format!(
                "'{}' is password protected",
                name
            )));
        }

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(ScanError::EmptyDocument(format!("'{}' has no pages", name)));
        }

        let page_texts: Vec<String> = page_numbers
            .iter()
            .map(|&number| Self::page_text_or_empty(doc.extract_text(&[number]), number, name))
            .collect();

        let mut text = page_texts.join(PAGE_SEPARATOR);
        if text.trim().is_empty() {
            // lopdf misses text drawn with some font encodings; pdf-extract handles more of them
            debug!("Per-page extraction of '{}' was empty, retrying with pdf-extract", name);
            text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
                ScanError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", name, e))
            })?;
        }

        if text.trim().is_empty() {
            return Err(ScanError::EmptyDocument(format!(
                "'{}' contains no extractable text (scanned image?)",
                name
            )));
        }

        Ok(ExtractedText {
            text,
            pages: page_numbers.len(),
        })
    }

    /// A page that fails to extract contributes no text but is logged
    fn page_text_or_empty<E: std::fmt::Display>(
        extracted: std::result::Result<String, E>,
        page: u32,
        name: &str,
    ) -> String {
        extracted.unwrap_or_else(|e| {
            warn!("Could not extract text from page {} of '{}': {}", page, name, e);
            String::new()
        })
    }

    fn declares_encryption(bytes: &[u8]) -> bool {
        bytes.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let content = fs::read_to_string(path).await?;
        Ok(ExtractedText::single_page(content))
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(ExtractedText::single_page(Self::markdown_to_text(&markdown_content)))
    }
}

impl MarkdownExtractor {
    pub fn markdown_to_text(markdown: &str) -> String {
        let parser = Parser::new(markdown);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        let text = html_output
            .replace("<br>", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n");
        let stripped = HTML_TAG.replace_all(&text, "");

        let decoded = stripped
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        decoded
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
