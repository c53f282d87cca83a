use axum::Json;

use crate::api::models::health::HealthResponse;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    summary = "Health check",
    description = "Returns a fixed payload while the server is accepting requests.",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "PDF to Text Converter API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
