//! HTTP seam shared by the remote elevation sources.

use crate::TerrainError;
use std::time::Duration;
use thiserror::Error;

/// Why a single fetch produced no body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Blocking HTTP GET.
///
/// Sources take this as a type parameter so tests can substitute
/// canned responses for the network.
pub trait HttpClient: Send + Sync {
    /// Returns the response body of a successful GET of `url`.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`HttpClient`] backed by `reqwest`'s blocking client.
///
/// Every request is bounded by the timeout given at construction.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn with_timeout(timeout: Duration) -> Result<Self, TerrainError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TerrainError::SourceUnavailable(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_owned(),
                }
            } else {
                FetchError::Transport {
                    url: url.to_owned(),
                    reason: e.to_string(),
                }
            }
        };

        let response = self.client.get(url).send().map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        // The body is read to completion (or the response dropped on
        // error) before returning, which releases the connection.
        response.bytes().map(|b| b.to_vec()).map_err(transport)
    }
}
