//! Shared handle to the hosted REST endpoint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("remote url '{0}' must start with http:// or https://")]
    InvalidUrl(String),
    #[error("access token contains characters not allowed in a header")]
    InvalidToken,
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Endpoint, access token and connection pool, built once at startup and
/// shared by every collection gateway. Never mutated after construction.
#[derive(Debug)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(
        base_url: impl Into<String>,
        anon_key: &SecretString,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let token = anon_key.expose_secret();
        let mut apikey = HeaderValue::from_str(token).map_err(|_| ClientError::InvalidToken)?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ClientError::InvalidToken)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("recipe-browser/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/rest/v1/{collection}`
    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    pub(crate) fn request(&self, method: Method, collection: &str) -> RequestBuilder {
        self.http.request(method, self.collection_url(collection))
    }
}
