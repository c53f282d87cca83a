use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::export::{DEFAULT_BASE_FILENAME, ExportFormat};

/// Text to turn into a downloadable file
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DownloadRequest {
    /// Text to export. Required and non-empty.
    pub text: Option<String>,
    /// Name to derive the download's name from; its extension is replaced (default `extracted_text`)
    #[schema(example = "annual_report.pdf")]
    pub filename: Option<String>,
    /// `docx` for a Word document; anything else produces plain text (default `txt`)
    #[schema(example = "docx")]
    pub format: Option<String>,
}

impl DownloadRequest {
    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_BASE_FILENAME)
    }

    pub fn format(&self) -> ExportFormat {
        self.format.as_deref().map(ExportFormat::parse).unwrap_or_default()
    }
}
