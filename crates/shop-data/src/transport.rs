//! Transports that carry a request to a server and bring back the response.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{FetchError, Method, RequestBuilder, Response};

/// Sends a finished request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request` and return the raw response, whatever its status.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the client's default timeouts.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Create a transport with an overall per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response::new(status, headers, body))
    }
}

/// Scripted transport for tests.
///
/// Responses are handed out in the order they were pushed, and every request
/// that reaches the transport is recorded. When the script runs dry the
/// transport fails the request.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<Response, FetchError>>>,
    requests: Mutex<Vec<RequestBuilder>>,
}

impl RecordingTransport {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push(Ok(Response::json_value(status, &body)));
    }

    /// Queue a plain-text response.
    pub fn push_text(&self, status: u16, body: &str) {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        self.push(Ok(Response::new(status, headers, body.as_bytes().to_vec())));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, error: FetchError) {
        self.push(Err(error));
    }

    fn push(&self, outcome: Result<Response, FetchError>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(outcome);
        }
    }

    /// Every request executed so far.
    pub fn requests(&self) -> Vec<RequestBuilder> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests executed so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        self.responses
            .lock()
            .map_err(|_| FetchError::RequestError("transport lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::RequestError(
                    "no scripted response left".to_string(),
                ))
            })
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        (**self).execute(request).await
    }
}
