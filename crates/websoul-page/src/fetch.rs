//! Fetching fragment markup.
//!
//! [`ResourceFetcher`] is the seam between assembly and I/O. Production code
//! uses [`SiteFetcher`], which routes `http(s)` URLs to `reqwest` and `file`
//! URLs to `tokio::fs`. Tests substitute their own implementation or point
//! [`SiteFetcher`] at a `wiremock` server.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::errors::FetchError;

/// Fetches the text body at a URL. Non-success statuses are errors.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch `url` and return its body.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// HTTP fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("websoul-page/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Reuse an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))?;
        debug!(%url, bytes = body.len(), "fetched over http");
        Ok(body)
    }
}

/// Reads `file:` URLs from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

#[async_trait]
impl ResourceFetcher for FileFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::InvalidPath(url.to_string()))?;
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.display().to_string(),
                source,
            })?;
        debug!(path = %path.display(), bytes = body.len(), "read from disk");
        Ok(body)
    }
}

/// Routes by scheme: `http`/`https` over the network, `file` from disk.
#[derive(Default)]
pub struct SiteFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SiteFetcher {
    /// Fetcher whose HTTP requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: HttpFetcher::new(timeout),
            file: FileFetcher,
        }
    }
}

#[async_trait]
impl ResourceFetcher for SiteFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        match url.scheme() {
            "http" | "https" => self.http.fetch(url).await,
            "file" => self.file.fetch(url).await,
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
