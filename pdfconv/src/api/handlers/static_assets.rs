//! HTTP handlers for static asset serving.

use axum::{
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::{errors::ErrorResponse, static_assets};

/// Serve an embedded asset, with `/` mapped to `index.html`
#[instrument]
pub async fn serve_embedded_asset(uri: Uri) -> Response {
    let mut path = uri.path().trim_start_matches('/');

    if path.is_empty() {
        path = "index.html";
    }

    match static_assets::Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => {
            debug!("No route or asset for: {}", uri.path());
            (
                StatusCode::NOT_FOUND,
                axum::Json(ErrorResponse {
                    error: "Not found".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum_test::TestServer;

    fn create_test_router() -> Router {
        Router::new().fallback(serve_embedded_asset)
    }

    #[tokio::test]
    async fn test_serve_root_returns_index_html() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("text/html")
        );
        assert_eq!(
            response.headers().get("cache-control").map(|v| v.to_str().unwrap()),
            Some("no-cache")
        );

        let text = response.text();
        assert!(text.contains("<!DOCTYPE html>"));
        assert!(text.contains("PDF to Text Converter"));
    }

    #[tokio::test]
    async fn test_serve_index_html_explicitly() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/index.html").await;

        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("PDF to Text Converter"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/dashboard/users/123").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Not found");
    }
}
