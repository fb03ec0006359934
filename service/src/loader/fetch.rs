//! Retrieval of remote sources
//!
//! Transport settings are passed with every call; a fetcher keeps no
//! per-request state, so relaxing certificate checks for one load never
//! affects another.

use reqwest::blocking::Client as BlockingHttpClient;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use super::traits::{LoaderError, LoaderResult};

/// Settings for a single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Whether server certificates are checked
    pub verify_certificates: bool,
    /// Value of the `Accept` header
    pub accept: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            verify_certificates: true,
            accept: None,
        }
    }
}

impl TransportConfig {
    /// Transport for reading RDF: certificates unchecked, RDF media types
    /// accepted
    #[must_use]
    pub fn rdf(accept: &str) -> Self {
        Self {
            verify_certificates: false,
            accept: Some(accept.to_string()),
        }
    }
}

/// Something that can retrieve the text behind a URL
pub trait SourceFetcher {
    /// Fetch `url` as text
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Fetch`] when the resource cannot be retrieved.
    fn fetch(&self, url: &Url, transport: &TransportConfig) -> LoaderResult<String>;
}

/// Fetcher over blocking HTTP
///
/// `file:` URLs are read from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    fn client(transport: &TransportConfig) -> LoaderResult<BlockingHttpClient> {
        BlockingHttpClient::builder()
            .danger_accept_invalid_certs(!transport.verify_certificates)
            .build()
            .map_err(|e| LoaderError::Configuration(format!("Cannot build HTTP client: {e}")))
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, url: &Url, transport: &TransportConfig) -> LoaderResult<String> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|()| LoaderError::Configuration(format!("Not a local file URL: {url}")))?;
            return Ok(std::fs::read_to_string(path)?);
        }

        debug!(%url, verify = transport.verify_certificates, "fetching source");
        let fetch_error = |message: String| LoaderError::Fetch {
            url: url.to_string(),
            message,
        };

        let mut request = Self::client(transport)?.get(url.clone());
        if let Some(accept) = &transport.accept {
            request = request.header(ACCEPT, accept);
        }
        let response = request
            .send()
            .map_err(|e| fetch_error(format!("Failed to fetch URL: {e}")))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP error: {}", response.status())));
        }

        response
            .text()
            .map_err(|e| fetch_error(format!("Failed to read response: {e}")))
    }
}
