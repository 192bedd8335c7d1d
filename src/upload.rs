//! Image hosting
//!
//! The rendered PNG is optionally pushed to an image host and the public URL
//! is echoed in the response. Hosting happens after the pipeline has
//! finished; a failed upload never invalidates the rendered image.

use serde_json::Value;
use thiserror::Error;

use crate::config::UploadConfig;

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "IMGBB_API_KEY";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("no image host API key configured (set upload.api_key or IMGBB_API_KEY)")]
    MissingApiKey,

    #[cfg(feature = "upload")]
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("image host response has no image URL")]
    MalformedResponse,
}

/// Somewhere a base64 PNG can be published.
pub trait ImageHost {
    /// Upload the image and return its public URL.
    fn upload(&self, base64_png: &str) -> Result<String, UploadError>;
}

/// Resolve the API key: configuration first, then [`API_KEY_ENV`].
pub fn resolve_api_key(config: &UploadConfig) -> Result<String, UploadError> {
    let usable = |key: &String| !key.trim().is_empty();
    config
        .api_key
        .clone()
        .filter(usable)
        .or_else(|| std::env::var(API_KEY_ENV).ok().filter(usable))
        .ok_or(UploadError::MissingApiKey)
}

/// Read `data.image.url` out of an imgbb-style response body.
pub fn parse_hosted_url(status: u16, body: &Value) -> Result<String, UploadError> {
    if !(200..300).contains(&status) || body.get("success") == Some(&Value::Bool(false)) {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(UploadError::Rejected { status, message });
    }
    body.pointer("/data/image/url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(UploadError::MalformedResponse)
}

#[cfg(feature = "upload")]
pub use imgbb::ImgbbHost;

#[cfg(feature = "upload")]
mod imgbb {
    use std::time::Duration;

    use reqwest::blocking::Client;

    use super::{parse_hosted_url, resolve_api_key, ImageHost, UploadError};
    use crate::config::UploadConfig;

    /// imgbb upload endpoint over a blocking HTTP client.
    #[derive(Debug, Clone)]
    pub struct ImgbbHost {
        client: Client,
        endpoint: String,
        api_key: String,
    }

    impl ImgbbHost {
        pub fn from_config(config: &UploadConfig) -> Result<Self, UploadError> {
            let api_key = resolve_api_key(config)?;
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?;
            Ok(Self {
                client,
                endpoint: config.endpoint.clone(),
                api_key,
            })
        }
    }

    impl ImageHost for ImgbbHost {
        fn upload(&self, base64_png: &str) -> Result<String, UploadError> {
            let response = self
                .client
                .post(&self.endpoint)
                .query(&[("key", self.api_key.as_str())])
                .form(&[("image", base64_png)])
                .send()?;
            let status = response.status().as_u16();
            let body: serde_json::Value = response.json()?;
            let url = parse_hosted_url(status, &body)?;
            tracing::info!(%url, "image hosted");
            Ok(url)
        }
    }
}
