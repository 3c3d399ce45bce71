pub mod endpoint;
pub mod http;

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;

pub use endpoint::{Endpoint, Method};
pub use http::HttpApiClient;

/// A single API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub body: Option<Value>,
    /// Bearer token, sent as `Authorization: Bearer <token>`
    pub token: Option<String>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            body: None,
            token: None,
            query: Vec::new(),
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Metrics key for this call
    pub fn key(&self) -> String {
        self.endpoint.key(self.method)
    }
}

/// Status code and parsed body of an API response.
///
/// The body is `None` when the response had no content or was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// The `data` member of the API envelope
    pub fn data(&self) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get("data"))
    }

    /// Numeric `data.id` of a created entity
    pub fn data_id(&self) -> Option<i64> {
        self.data().and_then(|d| d.get("id")).and_then(Value::as_i64)
    }
}

/// Transport seam between the workflow driver and the API under test
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
