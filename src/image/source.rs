//! Sources of image metadata.
//!
//! The cache talks to image servers only through [`ExtentSource`], so tests
//! and alternative backends can stand in for the HTTP implementation.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::MetadataError;

use super::address::INFO_DOCUMENT_SUFFIX;
use super::extent::{ImageExtent, InfoDocument};

/// Trait for fetching the extent of an image.
#[async_trait]
pub trait ExtentSource: Send + Sync {
    /// Fetch the extent of the image at `base_uri`.
    ///
    /// `base_uri` is already normalized (no `info.json` suffix, no trailing
    /// slash, path segments decoded).
    async fn fetch_extent(&self, base_uri: &str) -> Result<ImageExtent, MetadataError>;
}

/// Fetches `{base}/info.json` from a IIIF image server.
#[derive(Debug, Clone)]
pub struct HttpExtentSource {
    client: Client,
}

impl HttpExtentSource {
    /// Create a source with a default HTTP client.
    pub fn new() -> Result<Self, MetadataError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MetadataError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a source sharing an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Resolve the info document URL for a normalized base URI.
    ///
    /// The base is appended to as-is; run raw input through
    /// [`normalize_base_uri`](super::address::normalize_base_uri) first.
    pub fn info_url(base_uri: &str) -> Result<Url, MetadataError> {
        Url::parse(&format!("{base_uri}{INFO_DOCUMENT_SUFFIX}")).map_err(|e| {
            MetadataError::InvalidUri {
                uri: base_uri.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl ExtentSource for HttpExtentSource {
    async fn fetch_extent(&self, base_uri: &str) -> Result<ImageExtent, MetadataError> {
        let url = Self::info_url(base_uri)?;
        debug!(%url, "Fetching info document");

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/ld+json, application/json")
            .send()
            .await
            .map_err(|e| MetadataError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let info: InfoDocument = response
            .json()
            .await
            .map_err(|e| MetadataError::Decode(e.to_string()))?;

        info.extent()
    }
}
