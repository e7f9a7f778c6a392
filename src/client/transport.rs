//! Transport port and the reqwest implementation

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiToken;
use crate::error::{EtlError, EtlResult};

/// A GET request against one API endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Endpoint path relative to the API base, e.g. `plan_cuenta`
    pub endpoint: String,
    /// Query parameters in the order they are sent
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a request for an endpoint with no parameters
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Look up a query parameter by name
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    /// Server-provided `Retry-After`, when it was given in seconds
    pub retry_after: Option<Duration>,
}

impl ApiResponse {
    /// Build a response with no `Retry-After` header
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> EtlResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| EtlError::Json(format!("Failed to decode API response: {}", e)))
    }
}

/// Issues GET requests against the accounting API
pub trait HttpTransport {
    /// Send one request; a non-2xx status is a response, not an error
    fn get(&self, request: &ApiRequest) -> EtlResult<ApiResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, request: &ApiRequest) -> EtlResult<ApiResponse> {
        (**self).get(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn get(&self, request: &ApiRequest) -> EtlResult<ApiResponse> {
        (**self).get(request)
    }
}

/// Blocking reqwest transport, one connection pool per run
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    token: ApiToken,
}

impl ReqwestTransport {
    /// Create a transport for the given API base URL
    pub fn new(base_url: impl Into<String>, token: ApiToken, timeout: Duration) -> EtlResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ledger-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Full URL for an endpoint; the API expects a trailing slash
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.base_url, endpoint.trim_matches('/'))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, request: &ApiRequest) -> EtlResult<ApiResponse> {
        let url = self.endpoint_url(&request.endpoint);
        debug!(url = %url, params = request.query.len(), "GET");

        let response = self
            .client
            .get(&url)
            .query(&request.query)
            .header("Token", self.token.expose())
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text()?;

        debug!(url = %url, status, bytes = body.len(), "response");
        Ok(ApiResponse {
            status,
            body,
            retry_after,
        })
    }
}
