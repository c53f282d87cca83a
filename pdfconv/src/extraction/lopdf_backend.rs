use std::path::Path;

use lopdf::Document;

use super::{ExtractionError, PageSource, PdfBackend, Result};

/// [`PdfBackend`] backed by the pure-Rust `lopdf` parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for LopdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        let document = Document::load(path).map_err(|e| ExtractionError::Read(e.to_string()))?;
        Ok(Box::new(LopdfDocument(document)))
    }
}

struct LopdfDocument(Document);

impl PageSource for LopdfDocument {
    fn pages(&self) -> Vec<u32> {
        // BTreeMap keyed by page number, so already in document order
        self.0.get_pages().into_keys().collect()
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.0.extract_text(&[page]).map_err(|e| ExtractionError::Read(e.to_string()))
    }
}
