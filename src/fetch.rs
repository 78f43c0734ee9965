//! Blocking HTTP downloads for favicons and dashboard images.

use crate::config;
use std::time::Duration;

/// Error type for remote fetches
#[derive(Debug)]
pub enum FetchError {
    Network(String),
    Http(u16),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "Network error: {}", e),
            FetchError::Http(status) => write!(f, "HTTP status {}", status),
        }
    }
}

impl std::error::Error for FetchError {}

/// Something that can download a URL into memory.
/// Fetches run on worker threads, so implementations are shared across them.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher backed by a blocking reqwest client
pub struct HttpFetcher {
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(config::USER_AGENT)
            .timeout(Duration::from_secs(config::HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { http })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
