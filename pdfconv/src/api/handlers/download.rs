use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, instrument};

use crate::{
    REQUEST_TOO_LARGE,
    api::models::download::DownloadRequest,
    errors::{Error, Result},
    export,
};

#[utoipa::path(
    post,
    path = "/download",
    tag = "conversion",
    summary = "Download text as a file",
    description = "Render text as a plain-text or Word attachment. The name of the attachment is `filename` with its \
        extension replaced by the chosen format's. In DOCX output each blank-line separated block becomes a paragraph.",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "The rendered file, as an attachment. `text/plain; charset=utf-8` for text, the \
            WordprocessingML type for DOCX.", body = String, content_type = "application/octet-stream"),
        (status = 400, description = "Missing text or malformed body", body = crate::errors::ErrorResponse),
        (status = 413, description = "Payload too large", body = crate::errors::ErrorResponse),
        (status = 500, description = "The file could not be rendered", body = crate::errors::ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn download_text(payload: std::result::Result<Json<DownloadRequest>, JsonRejection>) -> Result<Response> {
    let Json(request) = payload.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge {
                message: REQUEST_TOO_LARGE.to_string(),
            }
        } else {
            Error::BadRequest {
                message: format!("Invalid request body: {}", e.body_text()),
            }
        }
    })?;

    let text = match request.text.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => {
            return Err(Error::BadRequest {
                message: "No text to download".to_string(),
            });
        }
    };

    let format = request.format();
    let file = export::export(text, request.filename(), format).map_err(|e| {
        error!("Failed to render {:?} download: {}", format, e);
        Error::Internal {
            operation: "create download file".to_string(),
        }
    })?;

    debug!(filename = %file.filename, bytes = file.bytes.len(), "Rendered download");

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, file.content_disposition()),
        ],
        file.bytes,
    )
        .into_response())
}
