//! PDF text extraction.
//!
//! The PDF library is treated as an opaque page sequence behind the [`PdfBackend`] and
//! [`PageSource`] traits. [`extract_text`] walks the pages in document order and joins their text;
//! [`LopdfBackend`] is the production implementation.
//!
//! Image-only documents are not OCR'd: when every page yields only whitespace the result is
//! [`NO_TEXT_FALLBACK`] instead of an empty string.

use std::path::Path;

mod lopdf_backend;

pub use lopdf_backend::LopdfBackend;

/// Returned in place of the extracted text when the document has no text layer.
pub const NO_TEXT_FALLBACK: &str = "No text could be extracted from this PDF. It might be a scanned document or image-based PDF.";

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors raised while opening a PDF or walking its pages
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// Anything the PDF library reports. Carries the library's message.
    #[error("Error reading PDF: {0}")]
    Read(String),
}

/// An opened document, viewed as an ordered sequence of pages.
pub trait PageSource {
    /// Page identifiers, in document order.
    fn pages(&self) -> Vec<u32>;

    /// Text content of a single page.
    fn page_text(&self, page: u32) -> Result<String>;
}

/// Opens documents from the filesystem.
pub trait PdfBackend: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>>;
}

/// Extract the text of every page, each followed by a newline.
///
/// Whitespace-only output is replaced by [`NO_TEXT_FALLBACK`].
pub fn extract_text(document: &dyn PageSource) -> Result<String> {
    let mut text = String::new();

    for page in document.pages() {
        text.push_str(&document.page_text(page)?);
        text.push('\n');
    }

    if text.trim().is_empty() {
        return Ok(NO_TEXT_FALLBACK.to_string());
    }

    Ok(text)
}

/// Open the PDF at `path` with `backend` and extract its text.
///
/// Blocking: callers on the async runtime should go through `spawn_blocking`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn extract_file(backend: &dyn PdfBackend, path: &Path) -> Result<String> {
    let document = backend.open(path)?;
    let page_count = document.pages().len();

    let text = extract_text(document.as_ref())?;

    tracing::info!(page_count, chars = text.len(), "PDF text extraction complete");
    Ok(text)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory stand-ins for the PDF library.

    use super::*;
    use std::collections::BTreeMap;

    /// A document whose pages hold fixed text. Page ids are 1-based.
    #[derive(Debug, Clone, Default)]
    pub struct FakeDocument {
        pages: BTreeMap<u32, std::result::Result<String, String>>,
    }

    impl FakeDocument {
        pub fn with_pages<I, S>(pages: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let pages = pages.into_iter().enumerate().map(|(i, text)| (i as u32 + 1, Ok(text.into()))).collect();
            Self { pages }
        }

        /// Make reading `page` fail with `message`.
        pub fn failing_on(mut self, page: u32, message: &str) -> Self {
            self.pages.insert(page, Err(message.to_string()));
            self
        }
    }

    impl PageSource for FakeDocument {
        fn pages(&self) -> Vec<u32> {
            self.pages.keys().copied().collect()
        }

        fn page_text(&self, page: u32) -> Result<String> {
            match self.pages.get(&page) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(message)) => Err(ExtractionError::Read(message.clone())),
                None => Err(ExtractionError::Read(format!("page {page} not found"))),
            }
        }
    }

    /// Hands out the same [`FakeDocument`] for every path, or fails to open anything.
    #[derive(Debug, Clone)]
    pub struct FakeBackend {
        document: std::result::Result<FakeDocument, String>,
        panics: bool,
    }

    impl FakeBackend {
        pub fn new(document: FakeDocument) -> Self {
            Self {
                document: Ok(document),
                panics: false,
            }
        }

        pub fn unreadable(message: &str) -> Self {
            Self {
                document: Err(message.to_string()),
                panics: false,
            }
        }

        /// A backend that panics inside `open`, like a parser bug would.
        pub fn panicking() -> Self {
            Self {
                document: Ok(FakeDocument::default()),
                panics: true,
            }
        }
    }

    impl PdfBackend for FakeBackend {
        fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
            // Mirror a real backend: the staged file must exist while it is being read
            if !path.exists() {
                return Err(ExtractionError::Read(format!("{} does not exist", path.display())));
            }
            if self.panics {
                panic!("parser crashed on {}", path.display());
            }
            match &self.document {
                Ok(document) => Ok(Box::new(document.clone())),
                Err(message) => Err(ExtractionError::Read(message.clone())),
            }
        }
    }
}
