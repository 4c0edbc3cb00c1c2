//! HTTP transport abstraction
//!
//! The pipeline only needs "send this request, give me status and body". The
//! trait keeps reqwest out of the pipeline and lets tests record dispatches.

use crate::models::{HttpMethod, ModeDefinition, OutgoingPayload};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub mod http;

pub use http::ReqwestTransport;

/// Everything needed to send one payload
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub method: HttpMethod,
    pub endpoint: Url,
    pub headers: BTreeMap<String, String>,
    /// Per-mode timeout; the transport default applies when None
    pub timeout: Option<Duration>,
    pub payload: OutgoingPayload,
}

impl DispatchRequest {
    pub fn for_mode(mode: &ModeDefinition, payload: OutgoingPayload) -> Self {
        Self {
            method: mode.method,
            endpoint: mode.endpoint.clone(),
            headers: mode.headers.clone(),
            timeout: mode.timeout,
            payload,
        }
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures before a response was received
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Abstract HTTP interface used by the scan pipeline
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return its status and body
    async fn send(&self, request: &DispatchRequest) -> Result<TransportResponse, TransportError>;

    /// Get transport name for logging
    fn name(&self) -> &str;
}
