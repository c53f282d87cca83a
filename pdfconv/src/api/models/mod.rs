//! API request and response data models.
//!
//! All models are annotated with `utoipa` so they appear in the OpenAPI document.
//! Error bodies use [`crate::errors::ErrorResponse`].

pub mod download;
pub mod health;
pub mod upload;
