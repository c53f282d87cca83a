//! OpenAPI documentation for the JSON endpoints.
//!
//! Served at `/openapi.json` and rendered by Scalar at `/docs`.

use utoipa::OpenApi;

use crate::{api, errors::ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PDF to Text Converter",
        description = "Extract the text of PDF documents and download it as plain text or DOCX."
    ),
    paths(
        api::handlers::upload::upload_file,
        api::handlers::download::download_text,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::models::upload::UploadResponse,
            api::models::download::DownloadRequest,
            api::models::health::HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "conversion", description = "PDF text extraction and export"),
        (name = "health", description = "Service liveness"),
    )
)]
pub struct ApiDoc;
