use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Extracted text of an uploaded PDF
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Always `true`; failures are reported with an error body instead
    pub success: bool,
    /// Text of every page, each followed by a newline
    pub text: String,
    /// Sanitized name of the uploaded file
    #[schema(example = "annual_report.pdf")]
    pub filename: String,
}
