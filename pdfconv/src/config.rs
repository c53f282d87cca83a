//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `PDFCONV_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PDFCONV_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PDFCONV_LIMITS__MAX_BODY_SIZE=1048576` sets the `limits.max_body_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use pdfconv::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Uploads**: `upload.temp_dir`, `upload.allowed_extensions` - where uploads are staged and what is accepted
//! - **Limits**: `limits.max_body_size` - request body cap, enforced before any handler runs
//! - **CORS**: `cors.allowed_origins`, `cors.allowed_headers`, `cors.allowed_methods`
//! - **Telemetry**: `enable_otel_export` - OTLP span export
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! PDFCONV_PORT=8080
//!
//! # Stage uploads somewhere specific (serverless hosts usually only allow /tmp)
//! PDFCONV_UPLOAD__TEMP_DIR=/tmp
//! ```

use axum::http::{HeaderName, Method};
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::errors::Error;

/// 16 MiB, the largest request body accepted by default.
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PDFCONV_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation, so an empty (or absent)
/// config file yields a working server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
    /// Upload staging configuration
    pub upload: UploadConfig,
    /// Resource limits for protecting system capacity
    pub limits: LimitsConfig,
    /// Cross-origin resource sharing configuration
    pub cors: CorsConfig,
}

/// Where uploaded files are staged while their text is extracted, and which files are accepted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Directory for temporary upload files. `None` uses the system temp directory.
    ///
    /// Created on startup if it does not exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    /// Accepted filename extensions, without the leading dot. Compared case-insensitively.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            allowed_extensions: vec!["pdf".to_string()],
        }
    }
}

impl UploadConfig {
    /// Resolved staging directory.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Whether `filename` carries one of the allowed extensions.
    ///
    /// The extension is whatever follows the last `.`; a name without a dot is never allowed.
    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, extension)) => {
                let extension = extension.to_lowercase();
                self.allowed_extensions.iter().any(|allowed| allowed.to_lowercase() == extension)
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes (default: 16 MiB)
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard", serialize_with = "serialize_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn serialize_wildcard<S>(serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("*")
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<CorsOrigin>,
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,
    /// Preflight cache lifetime in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            allowed_methods: ["GET", "PUT", "POST", "DELETE"].iter().map(|m| m.to_string()).collect(),
            max_age: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_otel_export: false,
            upload: UploadConfig::default(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.limits.max_body_size == 0 {
            return Err(Error::Internal {
                operation: "validate config: limits.max_body_size must be a positive number of bytes".to_string(),
            });
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(Error::Internal {
                operation: "validate config: upload.allowed_extensions cannot be empty".to_string(),
            });
        }

        if let Some(bad) = self
            .upload
            .allowed_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains('.'))
        {
            return Err(Error::Internal {
                operation: format!("validate config: invalid extension '{bad}' (give extensions without the leading dot)"),
            });
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "validate config: cors.allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        for header in &self.cors.allowed_headers {
            HeaderName::try_from(header.as_str()).map_err(|_| Error::Internal {
                operation: format!("validate config: '{header}' is not a valid header name"),
            })?;
        }

        for method in &self.cors.allowed_methods {
            Method::from_bytes(method.as_bytes()).map_err(|_| Error::Internal {
                operation: format!("validate config: '{method}' is not a valid HTTP method"),
            })?;
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("PDFCONV_").ignore(&["CONFIG"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
