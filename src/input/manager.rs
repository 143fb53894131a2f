//! Input manager for handling different file types

use crate::error::{MatchError, Result};
use crate::input::file_detector::FileType;
use crate::input::pdf_reader::PdfReader;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// A loaded input file, before any text processing
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedDocument {
    Pdf(Vec<u8>),
    Text(String),
}

pub struct InputManager {
    reader: PdfReader,
    cache: HashMap<String, String>,
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
            reader: PdfReader::new(),
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub fn with_reader(mut self, reader: PdfReader) -> Self {
        self.reader = reader;
        self
    }

    /// Read a PDF or text file without interpreting it
    pub async fn load(&self, path: &Path) -> Result<LoadedDocument> {
        if !path.exists() {
            return Err(MatchError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        match self.detect_file_type(path)? {
            FileType::Pdf => {
                info!("Loading PDF: {}", path.display());
                Ok(LoadedDocument::Pdf(fs::read(path).await?))
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                Ok(LoadedDocument::Text(fs::read_to_string(path).await?))
            }
            FileType::Unknown => Err(MatchError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            ))),
        }
    }

    /// Plain text of a file, PDFs read in layout order
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        let text = match self.load(path).await? {
            LoadedDocument::Pdf(bytes) => self.reader.read_bytes(&bytes),
            LoadedDocument::Text(text) => text,
        };

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| MatchError::InvalidInput(format!("File has no extension: {}", path.display())))?;

        Ok(FileType::from_extension(extension))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
