//! Error types for page assembly.
//!
//! Nothing here is fatal to a page load. Fetch failures and missing
//! placeholders are logged and recorded in the assembly report.

use thiserror::Error;

/// Errors turning a string into a [`Location`](crate::location::Location).
#[derive(Debug, Error)]
pub enum LocationError {
    /// Not a valid absolute URL or reference.
    #[error("invalid URL {href:?}: {source}")]
    Invalid {
        /// The offending input.
        href: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// URL without a hierarchical path (`mailto:`, `data:`).
    #[error("URL has no hierarchical path: {0}")]
    NotHierarchical(String),
    /// Relative file path given where an absolute one is needed.
    #[error("file path is not absolute: {0}")]
    NotAbsolute(String),
}

/// Errors fetching a fragment.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("failed to load {url} ({status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },
    /// Connection, TLS or body read failure.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error text.
        message: String,
    },
    /// Reading a local file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// No fetcher handles this scheme.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// `file:` URL that does not map to a local path.
    #[error("file URL has no local path: {0}")]
    InvalidPath(String),
}

impl FetchError {
    /// Short stable label for metrics and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Network { .. } => "network",
            Self::Io { .. } => "io",
            Self::UnsupportedScheme(_) => "unsupported_scheme",
            Self::InvalidPath(_) => "invalid_path",
        }
    }

    /// Map a `reqwest` error for `url`.
    pub fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
