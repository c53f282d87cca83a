//! # pdfconv: PDF to Text Converter
//!
//! `pdfconv` is a small HTTP service that extracts the text layer of uploaded PDF documents and
//! lets the client download (possibly edited) text again as a plain-text file or a Word document.
//!
//! ## Overview
//!
//! The service is stateless. An upload is streamed to a private temporary file, handed to a PDF
//! parser, and deleted again before the response goes out, whatever the outcome. Downloads are
//! rendered in memory from the JSON request body. Nothing is persisted between requests.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer.
//!
//! - [`extraction`]: walks the pages of a document behind the [`extraction::PdfBackend`] trait;
//!   [`extraction::LopdfBackend`] is the production parser
//! - [`export`]: renders text as `.txt` or `.docx` and builds the attachment headers
//! - [`filename`]: sanitizes client-supplied filenames
//! - [`api`]: request handlers and JSON models
//! - [`config`]: YAML + environment configuration
//! - [`telemetry`]: tracing subscriber and optional OTLP export
//!
//! PDF parsing is synchronous and runs on tokio's blocking pool.
//!
//! ### Request Flow
//!
//! `POST /upload` takes a multipart form with a `file` field. The filename must carry an allowed
//! extension (`pdf` by default). The body is streamed into a temporary file under
//! `upload.temp_dir`, extracted, and the file removed. The response is
//! `{"success": true, "text": ..., "filename": ...}`.
//!
//! `POST /download` takes `{"text", "filename", "format"}` and answers with an attachment.
//!
//! Request bodies over `limits.max_body_size` are refused with `413`.
//! Every error is a JSON `{"error": ...}` body, see [`errors::Error`].
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod filename;
mod openapi;
mod static_assets;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::extraction::{LopdfBackend, PdfBackend};
use crate::openapi::ApiDoc;
use anyhow::Context;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Error message for request bodies over `limits.max_body_size`.
pub const REQUEST_TOO_LARGE: &str = "Request body too large";

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .pdf_backend(Arc::new(LopdfBackend::new()))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub pdf_backend: Arc<dyn PdfBackend>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let methods = cors_config
        .allowed_methods
        .iter()
        .map(|m| Method::from_bytes(m.as_bytes()))
        .collect::<Result<Vec<_>, _>>()?;
    let headers = cors_config
        .allowed_headers
        .iter()
        .map(|h| HeaderName::try_from(h.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut cors = CorsLayer::new().allow_origin(allow_origin).allow_methods(methods).allow_headers(headers);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Give the body limit's plain-text `413` the same JSON shape as every other error.
async fn payload_too_large_as_json(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return errors::Error::PayloadTooLarge {
            message: REQUEST_TOO_LARGE.to_string(),
        }
        .into_response();
    }

    response
}

/// Build the application router with all endpoints and middleware.
///
/// Outermost first, a request passes tracing, CORS, then the body size limit. The limit is
/// enforced by `tower-http`, so axum's own default limit is disabled. Limit rejections are
/// rewritten to JSON inside the CORS layer, so they still carry the CORS headers.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/", get(api::handlers::static_assets::serve_embedded_asset))
        .route("/api/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::upload::upload_file))
        .route("/download", post(api::handlers::download::download_text))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(api::handlers::static_assets::serve_embedded_asset);

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(cors_layer)
            .layer(middleware::map_response(payload_too_large_as_json))
            .layer(MapResponseBodyLayer::new(Body::new))
            .layer(RequestBodyLimitLayer::new(state.config.limits.max_body_size))
            .layer(DefaultBodyLimit::disable()),
    );

    Ok(router)
}

/// The HTTP server.
///
/// 1. **Setup**: [`Application::new`] prepares the upload directory and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, in-flight requests finish and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance that parses PDFs with [`LopdfBackend`]
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_backend(config, Arc::new(LopdfBackend::new())).await
    }

    /// Create a new application instance with a specific PDF backend
    pub async fn new_with_backend(config: Config, pdf_backend: Arc<dyn PdfBackend>) -> anyhow::Result<Self> {
        debug!("Starting PDF converter with configuration: {:#?}", config);

        if let Some(temp_dir) = &config.upload.temp_dir {
            tokio::fs::create_dir_all(temp_dir)
                .await
                .with_context(|| format!("Failed to create upload directory {}", temp_dir.display()))?;
        }

        let app_state = AppState::builder().config(config.clone()).pdf_backend(pdf_backend).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "PDF converter listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
