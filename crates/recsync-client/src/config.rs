//! Client configuration and push-channel endpoint construction.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// First reconnect delay after a drop.
pub const DEFAULT_BASE_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound for the reconnect delay.
pub const DEFAULT_MAX_RECONNECT_DELAY: Duration = Duration::from_millis(30_000);

/// A base URL the push-channel endpoint cannot be derived from.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("unsupported base URL scheme: {scheme}")]
    UnsupportedScheme { scheme: String },
    #[error("base URL cannot carry path segments")]
    OpaqueBaseUrl,
}

/// Configuration for the progress sync client.
///
/// The base API URL is the only external input the subsystem consumes;
/// backoff bounds are overridable mainly for tests.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Base API URL, e.g. `https://api.example.com/api`.
    pub base_url: String,
    /// First reconnect delay.
    pub base_reconnect_delay: Duration,
    /// Reconnect delay cap.
    pub max_reconnect_delay: Duration,
}

impl SyncConfig {
    /// Configuration with default backoff bounds.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_reconnect_delay: DEFAULT_BASE_RECONNECT_DELAY,
            max_reconnect_delay: DEFAULT_MAX_RECONNECT_DELAY,
        }
    }

    /// Derive the channel URL: `http(s)` becomes `ws(s)`, the fixed
    /// `/downloads/ws` segment is appended, and the bearer token rides as
    /// the `token` query parameter.
    ///
    /// `https://api.example.com/api` →
    /// `wss://api.example.com/api/downloads/ws?token=<jwt>`
    pub fn endpoint_url(&self, token: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(ClientError::UnsupportedScheme {
                    scheme: other.to_string(),
                });
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| ClientError::OpaqueBaseUrl)?;

        url.path_segments_mut()
            .map_err(|()| ClientError::OpaqueBaseUrl)?
            .pop_if_empty()
            .extend(["downloads", "ws"]);

        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }
}
