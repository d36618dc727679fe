//! Outbound fetches of `<name>_url` links.
//!
//! # Responsibilities
//! - Forward only allow-listed request headers to the linked resource
//! - Issue a single GET per link
//! - Deserialize the fetched body as JSON
//!
//! # Design Decisions
//! - The HTTP client is hidden behind [`Transport`]; `reqwest` is the default
//! - No retries and no timeout at this layer
//! - Header names compare case-insensitively (`HeaderName` is lowercase)

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::http::{
    header::{InvalidHeaderName, AUTHORIZATION},
    HeaderMap, HeaderName,
};
use serde_json::Value;

use crate::include::error::{BoxError, IncludeError};
use crate::observability::metrics;

/// Header names that may be copied from the incoming request onto fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedHeaders(Vec<HeaderName>);

impl AllowedHeaders {
    /// Build an allow-list from configured names.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, InvalidHeaderName> {
        let mut allowed = Vec::with_capacity(names.len());
        for name in names {
            let name = HeaderName::from_bytes(name.as_ref().trim().as_bytes())?;
            if !allowed.contains(&name) {
                allowed.push(name);
            }
        }
        Ok(Self(allowed))
    }

    /// Copy the allowed subset of `headers`, keeping every value of each.
    pub fn select(&self, headers: &HeaderMap) -> HeaderMap {
        let mut forwarded = HeaderMap::new();
        for name in &self.0 {
            for value in headers.get_all(name) {
                forwarded.append(name.clone(), value.clone());
            }
        }
        forwarded
    }

    pub fn names(&self) -> &[HeaderName] {
        &self.0
    }
}

impl Default for AllowedHeaders {
    fn default() -> Self {
        Self(vec![AUTHORIZATION])
    }
}

/// HTTP GET collaborator used by [`LinkFetcher`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` with exactly `headers` and return the body text.
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<String, BoxError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    reject_error_status: bool,
}

impl HttpTransport {
    pub fn new(reject_error_status: bool) -> Self {
        Self::with_client(reqwest::Client::new(), reject_error_status)
    }

    pub fn with_client(client: reqwest::Client, reject_error_status: bool) -> Self {
        Self {
            client,
            reject_error_status,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<String, BoxError> {
        let response = self.client.get(url).headers(headers).send().await?;
        let response = if self.reject_error_status {
            response.error_for_status()?
        } else {
            response
        };
        Ok(response.text().await?)
    }
}

/// Fetches a linked resource and decodes it as JSON.
#[derive(Clone)]
pub struct LinkFetcher {
    transport: Arc<dyn Transport>,
    allowed: AllowedHeaders,
}

impl LinkFetcher {
    pub fn new(transport: Arc<dyn Transport>, allowed: AllowedHeaders) -> Self {
        Self { transport, allowed }
    }

    /// GET `url`, forwarding the allowed subset of `headers`.
    pub async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<Value, IncludeError> {
        let forwarded = self.allowed.select(headers);
        tracing::debug!(
            url = %url,
            forwarded = ?forwarded.keys().collect::<Vec<_>>(),
            "Fetching included resource"
        );

        let start = Instant::now();
        let body = match self.transport.get(url, forwarded).await {
            Ok(body) => body,
            Err(source) => {
                metrics::record_fetch("transport_error", start);
                return Err(IncludeError::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        };

        match serde_json::from_str(&body) {
            Ok(value) => {
                metrics::record_fetch("ok", start);
                Ok(value)
            }
            Err(source) => {
                metrics::record_fetch("parse_error", start);
                Err(IncludeError::Parse {
                    url: url.to_string(),
                    body,
                    source,
                })
            }
        }
    }
}

impl std::fmt::Debug for LinkFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkFetcher")
            .field("allowed", &self.allowed)
            .finish_non_exhaustive()
    }
}
