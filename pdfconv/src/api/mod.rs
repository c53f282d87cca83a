//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - `POST /upload`: extract the text of an uploaded PDF
//! - `POST /download`: render text as a `.txt` or `.docx` attachment
//! - `GET /api/health`: liveness check
//! - `GET /`: the converter's web page
//!
//! The JSON endpoints are described by an OpenAPI document at `/openapi.json`, browsable at `/docs`.

pub mod handlers;
pub mod models;
