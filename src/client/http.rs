use super::{ApiClient, ApiRequest, ApiResponse, Method};
use crate::error::TransportError;
use async_trait::async_trait;
use std::time::Duration;

/// reqwest-backed client for a live API
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
        })
    }

    pub fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base_url, request.endpoint.path())
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout_ms)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        log::debug!("{} {}", request.method, url);

        let mut req = self.client.request(method, &url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(token) = &request.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let res = req.send().await.map_err(|e| self.classify(e))?;
        let status = res.status().as_u16();
        let bytes = res.bytes().await.map_err(|e| self.classify(e))?;

        // Empty or non-JSON bodies are legal (e.g. 204); assertions treat them as absent
        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };

        log::debug!("{} {} -> {}", request.method, url, status);
        Ok(ApiResponse::new(status, body))
    }
}
