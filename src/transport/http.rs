use super::{RawResponse, Transport, TransportError};
use crate::config::HttpConfig;
use crate::request::CompiledRequest;
use async_trait::async_trait;
use reqwest::Proxy;
use tracing::debug;

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);

        if let Some(proxy_url) = &config.proxy_url {
            // An unparsable proxy is ignored rather than failing client construction.
            if let Ok(proxy) = Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (shared pools, custom TLS, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &CompiledRequest) -> Result<RawResponse, TransportError> {
        let mut req = self
            .client
            .request(request.method.into(), request.url.clone());

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!(
            http_status = status,
            body_len = body.len(),
            url = request.url.as_str(),
            "openai-kit transport exchange complete"
        );

        Ok(RawResponse { status, body })
    }
}
