//! HTTP/JSON client for the storefront REST API.
//!
//! Provides a small builder API over an injectable [`Transport`]: production
//! code sends through [`ReqwestTransport`], tests script responses with
//! [`RecordingTransport`] and inspect what was sent.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_data::{FetchClient, ReqwestTransport};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Stats {
//!     total_orders: u64,
//! }
//!
//! let client = FetchClient::new(ReqwestTransport::new()?)
//!     .with_base_url("http://localhost:5000")
//!     .with_bearer_token(token);
//!
//! let stats: Stats = client
//!     .get("/api/orders/stats")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod error;
mod request;
mod response;
mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::{Response, UNKNOWN_ERROR_MESSAGE};
pub use transport::{RecordingTransport, ReqwestTransport, Transport};

/// HTTP client for making outbound requests.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: BTreeMap<String, String>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.keys())
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client sending through `transport`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            base_url: None,
            default_headers: BTreeMap::new(),
            transport: Arc::new(transport),
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        self.with_default_header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Replace or drop the bearer token on an existing client.
    pub fn set_bearer_token(&mut self, token: Option<&str>) {
        match token {
            Some(token) => {
                self.default_headers
                    .insert("Authorization".to_string(), format!("Bearer {}", token));
            }
            None => {
                self.default_headers.remove("Authorization");
            }
        }
    }

    /// Whether requests carry a bearer token.
    pub fn has_bearer_token(&self) -> bool {
        self.default_headers.contains_key("Authorization")
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    url
                } else {
                    format!("{}{}", base.trim_end_matches('/'), url)
                }
            }
            None => url,
        };

        let mut builder = RequestBuilder::new(method, full_url).accept("application/json");
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// Send the request and return the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        let method = self.builder.method.as_str();
        let url = self.builder.url.clone();
        tracing::debug!(method, url = %url, "sending request");

        let response = self.transport.execute(self.builder).await;
        match &response {
            Ok(resp) => tracing::debug!(method, url = %url, status = resp.status, "response received"),
            Err(e) => tracing::debug!(method, url = %url, error = %e, "request failed"),
        }
        response
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_base_url_and_default_headers() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!([]));

        let client = FetchClient::new(Arc::clone(&transport))
            .with_base_url("http://localhost:5000/")
            .with_bearer_token("secret");

        client.get("/api/orders").send().await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url(), "http://localhost:5000/api/orders");
        assert_eq!(sent.header_value("authorization"), Some("Bearer secret"));
        assert_eq!(sent.header_value("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_absolute_url_bypasses_base() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({}));

        let client = FetchClient::new(Arc::clone(&transport)).with_base_url("http://a");
        client.get("https://b/x").send().await.unwrap();

        assert_eq!(transport.requests()[0].url(), "https://b/x");
    }

    #[test]
    fn test_set_bearer_token() {
        let mut client = FetchClient::new(RecordingTransport::new());
        assert!(!client.has_bearer_token());

        client.set_bearer_token(Some("t"));
        assert!(client.has_bearer_token());

        client.set_bearer_token(None);
        assert!(!client.has_bearer_token());
    }
}
