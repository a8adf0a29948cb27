//! Input manager for handling different file types

use crate::error::{Result, ScanError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    ExtractedText, MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, ExtractedText>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        Ok(self.extract(path).await?.text)
    }

    /// Extract text and page count, reusing an earlier extraction of the same path
    pub async fn extract(&mut self, path: &Path) -> Result<ExtractedText> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(ScanError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let extracted = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(ScanError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}. Supported: pdf, txt, md",
                    path.display()
                )));
            }
        };

        if extracted.text.trim().is_empty() {
            return Err(ScanError::EmptyDocument(format!(
                "{} contains no text",
                path.display()
            )));
        }

        if extracted.pages > 1 {
            warn!(
                "{} has {} pages; recruiters and ATS filters favour a one-page resume",
                path.display(),
                extracted.pages
            );
        }

        if self.enable_cache {
            self.cache.insert(path_str, extracted.clone());
        }

        Ok(extracted)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
