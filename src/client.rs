// 🌐 Source Client
// Bounded, timeout-protected fetches against external civic data sources.
//
// Every call returns an explicit Result. Call sites decide whether a
// TransportError is absorbed (item-level) or propagated (page-level).

use crate::error::TransportError;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// CAPABILITY
// ============================================================================

/// Fallible fetch capability consumed by the pipelines.
pub trait SourceClient {
    /// GET a URL and decode the body as JSON
    fn get_json(&self, url: &str) -> Result<Value, TransportError>;

    /// GET a URL and return the body as text
    fn get_html(&self, url: &str) -> Result<String, TransportError>;
}

impl<T: SourceClient + ?Sized> SourceClient for &T {
    fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        (**self).get_json(url)
    }

    fn get_html(&self, url: &str) -> Result<String, TransportError> {
        (**self).get_html(url)
    }
}

// ============================================================================
// HTTP IMPLEMENTATION
// ============================================================================

pub struct HttpSourceClient {
    client: Client,
}

impl HttpSourceClient {
    /// Client with a fixed connect/read timeout; redirects are followed.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(concat!("civic-ingest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network {
                url: String::new(),
                reason: format!("could not build HTTP client: {e}"),
            })?;

        Ok(HttpSourceClient { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, TransportError> {
        info!(url, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl SourceClient for HttpSourceClient {
    fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.get(url)?
            .json::<Value>()
            .map_err(|e| TransportError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn get_html(&self, url: &str) -> Result<String, TransportError> {
        self.get(url)?.text().map_err(|e| TransportError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

// ============================================================================
// URL HELPERS
// ============================================================================

/// Resolve a path or absolute URL against the API base and force JSON output.
///
/// `/bills/?limit=5` on `https://api.openparliament.ca` becomes
/// `https://api.openparliament.ca/bills/?limit=5&format=json`.
pub fn api_url(base: &str, path_or_url: &str) -> String {
    let mut url = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
        path_or_url.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path_or_url.trim_start_matches('/')
        )
    };

    if !url.contains("format=") {
        let separator = if url.contains('?') { '&' } else { '?' };
        url.push(separator);
        url.push_str("format=json");
    }

    url
}

/// Absolute URL for a site-relative resource path (e.g. a photo).
pub fn absolute_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
