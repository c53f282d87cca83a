use std::path::Path;

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::{
    AppState, REQUEST_TOO_LARGE,
    api::models::upload::UploadResponse,
    errors::{Error, Result},
    extraction,
    filename::secure_filename,
};

/// Name of the multipart field carrying the document
const FILE_FIELD: &str = "file";

fn no_file_selected() -> Error {
    Error::BadRequest {
        message: "No file selected".to_string(),
    }
}

fn processing_failed(error: impl std::fmt::Display) -> Error {
    Error::Processing {
        message: format!("Failed to process PDF: {error}"),
    }
}

fn multipart_error(error: MultipartError) -> Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: REQUEST_TOO_LARGE.to_string(),
        }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", error.body_text()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "conversion",
    summary = "Extract text from a PDF",
    description = "Upload a PDF in the multipart field `file`. The text of every page is returned in page order, \
        each page followed by a newline. Documents without a text layer return a fixed explanatory sentence instead.",
    request_body(
        content_type = "multipart/form-data",
        description = "The PDF to convert, in a field named `file`"
    ),
    responses(
        (status = 200, description = "Text extracted", body = UploadResponse),
        (status = 400, description = "No file, or not a PDF", body = crate::errors::ErrorResponse),
        (status = 413, description = "Payload too large", body = crate::errors::ErrorResponse),
        (status = 500, description = "The PDF could not be read, or extraction failed unexpectedly", body = crate::errors::ErrorResponse)
    )
)]
#[instrument(skip_all, fields(filename = tracing::field::Empty))]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected upload without a multipart body: {}", e);
        no_file_selected()
    })?;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let client_filename = field.file_name().unwrap_or_default().to_string();
        if client_filename.is_empty() {
            return Err(no_file_selected());
        }
        if !state.config.upload.is_allowed(&client_filename) {
            return Err(Error::BadRequest {
                message: "Please upload a valid PDF file".to_string(),
            });
        }

        let filename = secure_filename(&client_filename);
        tracing::Span::current().record("filename", filename.as_str());

        let temp_file = stage_upload(&mut field, &state.config.upload.temp_dir()).await?;
        let text = extract_staged(&state, &temp_file).await;

        // Removed before responding, whatever the outcome
        let temp_path = temp_file.path().to_path_buf();
        if let Err(e) = temp_file.close() {
            warn!(path = %temp_path.display(), "Failed to remove temporary upload: {}", e);
        }

        let text = text?;
        info!(chars = text.len(), "Extracted text from upload");

        return Ok(Json(UploadResponse {
            success: true,
            text,
            filename,
        }));
    }

    Err(no_file_selected())
}

/// Stream a multipart field into a fresh temporary file under `dir`.
///
/// The file is deleted when the returned handle is dropped, including when this function bails out
/// part-way through the body.
async fn stage_upload(field: &mut Field<'_>, dir: &Path) -> Result<NamedTempFile> {
    let temp_file = tempfile::Builder::new()
        .prefix("pdfconv-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(processing_failed)?;

    let mut writer = tokio::fs::File::from_std(temp_file.reopen().map_err(processing_failed)?);
    let mut total_size = 0usize;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        total_size += chunk.len();
        writer.write_all(&chunk).await.map_err(processing_failed)?;
    }
    writer.flush().await.map_err(processing_failed)?;

    debug!(path = %temp_file.path().display(), total_size, "Staged upload");
    Ok(temp_file)
}

/// Run the blocking PDF parser on the staged file.
async fn extract_staged(state: &AppState, temp_file: &NamedTempFile) -> Result<String> {
    let backend = state.pdf_backend.clone();
    let path = temp_file.path().to_path_buf();

    tokio::task::spawn_blocking(move || extraction::extract_file(backend.as_ref(), &path))
        .await
        .map_err(|e| Error::Other(anyhow::Error::new(e).context("PDF extraction task did not complete")))?
        .map_err(processing_failed)
}
