//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates its input, delegates to the extraction or export layer, and maps failures
//! onto [`crate::errors::Error`], which renders as a JSON `{"error": ...}` body.
//!
//! # Handler Modules
//!
//! - [`upload`]: PDF upload and text extraction
//! - [`download`]: text export as `.txt` or `.docx`
//! - [`health`]: liveness check
//! - [`static_assets`]: the embedded web page

pub mod download;
pub mod health;
pub mod static_assets;
pub mod upload;
