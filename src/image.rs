//! Lazily cached remote image.
//!
//! When an image origin URL is configured, the first view fetches the image
//! (following redirects) and caches its bytes and content type for the
//! lifetime of the process. Later views reuse the cached copy without any
//! outbound traffic. A failed fetch leaves the cache empty so the next view
//! tries again; until one succeeds, views fall back to the embedded pixel.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tokio::sync::OnceCell;
use tracing::{debug, info_span, Instrument};

use crate::error::{BeaconError, Result};

/// Configuration for the image origin fetch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Image origin URL; `None` disables remote serving entirely.
    pub url: Option<String>,
    /// Timeout for the origin fetch.
    pub timeout: Duration,
    /// Maximum number of redirects to follow.
    pub max_redirects: u32,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: "Beacon-Fetch/1.0".to_string(),
        }
    }
}

/// Image bytes and content type as served by the origin.
#[derive(Debug, Clone)]
pub struct CachedImage {
    /// Raw image bytes, passed through unmodified.
    pub bytes: Bytes,
    /// Content type reported by the origin.
    pub content_type: String,
}

/// Process-lifetime cache of the remote image.
///
/// The cache is a single-initialization cell: concurrent first views race to
/// initialize it and the cell serializes them, so the origin sees at most one
/// in-flight fetch at a time. There is no invalidation or refresh.
#[derive(Debug, Clone)]
pub struct ImageStore {
    client: reqwest::Client,
    url: Option<String>,
    cached: Arc<OnceCell<CachedImage>>,
}

impl ImageStore {
    /// Creates a new image store with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `BeaconError::Configuration` if the HTTP client cannot be
    /// built with the provided settings.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .build()
            .map_err(|e| {
                BeaconError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, url: config.url, cached: Arc::new(OnceCell::new()) })
    }

    /// Whether a remote image origin is configured.
    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Whether the remote image has been fetched and cached.
    pub fn is_cached(&self) -> bool {
        self.cached.initialized()
    }

    /// Returns the remote image, fetching and caching it on first use.
    ///
    /// Returns `Ok(None)` when no origin URL is configured.
    ///
    /// # Errors
    ///
    /// - `FetchNetwork` for connection failures and timeouts
    /// - `FetchStatus` for non-2xx origin responses
    pub async fn serve(&self) -> Result<Option<CachedImage>> {
        let Some(url) = &self.url else { return Ok(None) };

        let image = self
            .cached
            .get_or_try_init(|| self.fetch_origin(url))
            .await?;

        Ok(Some(image.clone()))
    }

    /// Fetches the image from the origin.
    async fn fetch_origin(&self, url: &str) -> Result<CachedImage> {
        let span = info_span!("image_fetch", url = %url);

        async move {
            debug!("fetching image origin");

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| BeaconError::fetch_network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(BeaconError::fetch_status(status.as_u16()));
            }

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("image/png")
                .to_string();

            let bytes = response
                .bytes()
                .await
                .map_err(|e| BeaconError::fetch_network(e.to_string()))?;

            debug!(size = bytes.len(), content_type = %content_type, "image origin cached");

            Ok(CachedImage { bytes, content_type })
        }
        .instrument(span)
        .await
    }
}
