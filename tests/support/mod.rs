//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use mockito::{Mock, Server, ServerGuard};
use openai_kit::{
    CompiledRequest, Credentials, HttpConfig, OpenAiClient, RawResponse, Transport, TransportError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const MODEL_JSON: &str = r#"{
    "id": "text-davinci-003",
    "object": "model",
    "owned_by": "openai-internal",
    "permission": [{
        "id": "modelperm-1",
        "object": "model_permission",
        "created": 1674000000000,
        "allow_create_engine": false,
        "allow_sampling": true,
        "allow_logprobs": true,
        "allow_search_indices": false,
        "allow_view": true,
        "allow_fine_tuning": false,
        "organization": "*",
        "group": null,
        "is_blocking": false
    }]
}"#;

type Responder = dyn Fn(&CompiledRequest) -> Result<RawResponse, TransportError> + Send + Sync;

/// In-memory transport that counts calls and holds every response until released.
pub struct GatedTransport {
    calls: AtomicUsize,
    gate: Semaphore,
    respond: Box<Responder>,
    last_request: Mutex<Option<CompiledRequest>>,
}

impl GatedTransport {
    pub fn new(
        respond: impl Fn(&CompiledRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            respond: Box::new(respond),
            last_request: Mutex::new(None),
        })
    }

    pub fn ok(body: &'static str) -> Arc<Self> {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(RawResponse::new(status, body)))
    }

    /// Let every pending and future request through.
    pub fn release(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompiledRequest> {
        self.last_request.lock().unwrap().clone()
    }

    /// Yield until at least `n` requests have reached the transport.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: &CompiledRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;
        (self.respond)(request)
    }
}

pub fn client_with(transport: &Arc<GatedTransport>) -> OpenAiClient {
    OpenAiClient::builder()
        .credentials(Credentials::new("sk-test", None).unwrap())
        .transport(transport.clone())
        .build()
        .expect("client")
}

/// Test fixture that manages a mock HTTP server.
pub struct MockServerFixture {
    pub server: ServerGuard,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    /// Client that talks to the mock server over real HTTP.
    pub fn client(&self, organization: Option<&str>) -> OpenAiClient {
        OpenAiClient::builder()
            .credentials(Credentials::new("sk-test", organization.map(str::to_string)).unwrap())
            .http_config(HttpConfig::default())
            .base_url_override(self.server.url())
            .build()
            .expect("client")
    }

    /// Mock a JSON response for `method path`.
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
