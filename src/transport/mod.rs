//! Outbound HTTP abstraction.
//!
//! The execution engine only needs `send(request) -> (status, bytes)`; any HTTP stack
//! can back it. [`HttpTransport`] is the reqwest implementation used by default.

mod http;

pub use http::HttpTransport;

use crate::request::CompiledRequest;
use async_trait::async_trait;
use bytes::Bytes;

/// Status code and full body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &CompiledRequest) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
