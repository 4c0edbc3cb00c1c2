//! reqwest-backed transport

use crate::models::HttpMethod;
use crate::models::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::transport::{DispatchRequest, HttpTransport, TransportError, TransportResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::time::Duration;

/// Sends requests through a shared reqwest client
pub struct ReqwestTransport {
    client: Client,
    base_timeout: Duration,
}

impl ReqwestTransport {
    /// `base_timeout` applies to modes without their own timeout
    pub fn new(base_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_timeout,
        })
    }

    pub fn base_timeout(&self) -> Duration {
        self.base_timeout
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn headers(request: &DispatchRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header {}: {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: Client::new(),
            base_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &DispatchRequest) -> Result<TransportResponse, TransportError> {
        let timeout = request.timeout.unwrap_or(self.base_timeout);
        let builder = self
            .client
            .request(Self::method(request.method), request.endpoint.clone())
            .timeout(timeout)
            .headers(Self::headers(request)?);

        let builder = if request.method.carries_body() {
            builder.json(&request.payload)
        } else {
            builder.query(&request.payload)
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::trace!(status, endpoint = %request.endpoint, "Response received");

        Ok(TransportResponse { status, body })
    }

    fn name(&self) -> &str {
        "http"
    }
}
