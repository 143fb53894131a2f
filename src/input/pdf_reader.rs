//! Layout-aware PDF text extraction
//!
//! Text segments are read with their bounding boxes and emitted top to bottom,
//! left to right, page by page. When pdfium is unavailable the whole-document
//! text from `pdf-extract` is used instead. Unreadable input yields an empty
//! string.

use crate::error::{MatchError, Result};
use log::{debug, error, warn};
use pdfium_render::prelude::*;
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};

/// A positioned run of text, top-left origin
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl LayoutBlock {
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self { x, y, text: text.into() }
    }
}

/// Produces per-page layout blocks from PDF bytes
pub trait LayoutSource: Send + Sync {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<Vec<LayoutBlock>>>;
}

/// pdfium text segments, bound from `./` first and then the system library
pub struct PdfiumLayout;

impl PdfiumLayout {
    fn bind() -> Result<Pdfium> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| MatchError::PdfExtraction(format!("Failed to bind pdfium library: {}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl LayoutSource for PdfiumLayout {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<Vec<LayoutBlock>>> {
        let pdfium = Self::bind()?;
        let doc = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| MatchError::PdfExtraction(format!("Failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for (page_idx, page) in doc.pages().iter().enumerate() {
            let page_height = page.height().value;
            let text = page
                .text()
                .map_err(|e| MatchError::PdfExtraction(format!("Failed to get page text: {}", e)))?;

            let mut blocks = Vec::new();
            for segment in text.segments().iter() {
                let bounds = segment.bounds();
                // PDF space has a bottom-left origin
                let y = page_height - bounds.top().value;
                blocks.push(LayoutBlock::new(bounds.left().value, y, segment.text()));
            }

            debug!("Page {}: {} layout blocks", page_idx + 1, blocks.len());
            pages.push(blocks);
        }

        Ok(pages)
    }
}

pub struct PdfReader {
    layout: Option<Box<dyn LayoutSource>>,
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfReader {
    pub fn new() -> Self {
        Self::with_layout(Box::new(PdfiumLayout))
    }

    pub fn with_layout(layout: Box<dyn LayoutSource>) -> Self {
        Self { layout: Some(layout) }
    }

    /// Reader that only uses the plain `pdf-extract` text
    pub fn without_layout() -> Self {
        Self { layout: None }
    }

    /// Plain text in reading order, empty on any failure
    pub fn read_bytes(&self, bytes: &[u8]) -> String {
        if let Some(layout) = &self.layout {
            match layout.pages(bytes) {
                Ok(pages) => return order_blocks(pages),
                Err(e) => warn!("Layout extraction unavailable, falling back to plain text: {}", e),
            }
        }

        match Self::plain_text(bytes) {
            Ok(text) => text,
            Err(e) => {
                error!("Error reading PDF: {}", e);
                String::new()
            }
        }
    }

    fn plain_text(bytes: &[u8]) -> Result<String> {
        // pdf-extract can panic on malformed documents
        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(MatchError::PdfExtraction(format!("Failed to extract text from PDF: {}", e))),
            Err(_) => Err(MatchError::PdfExtraction("PDF parser panicked".to_string())),
        }
    }
}

/// Sort each page's blocks by (y, x) and join their text, one block per line
pub fn order_blocks(pages: Vec<Vec<LayoutBlock>>) -> String {
    let mut text = String::new();

    for mut blocks in pages {
        blocks.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        for block in blocks {
            text.push_str(&block.text);
            text.push('\n');
        }
    }

    text
}
