use crate::codec::JsonCodec;
use crate::config::Credentials;
use crate::endpoint::{Endpoint, Method, DEFAULT_HOST, DEFAULT_SCHEME};
use crate::request::{compile, CompiledRequest, RequestIdentity};
use crate::transport::{RawResponse, Transport, TransportError};
use crate::{Error, Result};
use bytes::Bytes;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::inflight::{Attachment, InFlightRegistry, SharedOutcome, SlotGuard};
use super::signals::InflightSnapshot;

/// Typed API client.
///
/// Cheap to clone; clones share the transport and the in-flight registry, so concurrent
/// identical calls from any clone are coalesced into one network operation.
#[derive(Clone)]
pub struct OpenAiClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) credentials: Arc<Credentials>,
    pub(crate) codec: JsonCodec,
    pub(crate) registry: InFlightRegistry,
    pub(crate) base: ClientBase,
}

impl OpenAiClient {
    /// Create a client from environment credentials and the default HTTP transport.
    pub fn from_env() -> Result<Self> {
        crate::client::builder::ClientBuilder::new().build()
    }

    pub fn builder() -> crate::client::builder::ClientBuilder {
        crate::client::builder::ClientBuilder::new()
    }

    /// Endpoint descriptor rooted at this client's API base.
    pub fn endpoint<R>(&self, method: Method, path: impl Into<String>) -> Endpoint<R> {
        Endpoint::new(method, path)
            .with_scheme(self.base.scheme.as_str())
            .with_host(self.base.host.as_str())
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Snapshot of outstanding network operations.
    pub fn signals(&self) -> InflightSnapshot {
        InflightSnapshot {
            outstanding: self.registry.len(),
        }
    }

    /// Compile an endpoint without sending it.
    pub fn compile<R>(&self, endpoint: &Endpoint<R>) -> Result<CompiledRequest> {
        compile(endpoint, &self.credentials, &self.codec)
    }

    /// Execute an endpoint and decode its response.
    ///
    /// Concurrent calls that compile to the same request (and expect the same response
    /// type) share a single network operation and all observe its outcome.
    pub async fn execute<R>(&self, endpoint: &Endpoint<R>) -> Result<R>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.execute_with_cancel(endpoint, &CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), observing a cancellation token.
    ///
    /// If this call started the network operation, cancelling aborts it and every
    /// attached caller receives `Error::Cancelled`. If it joined an operation started by
    /// someone else, cancelling only stops this caller from waiting.
    pub async fn execute_with_cancel<R>(
        &self,
        endpoint: &Endpoint<R>,
        cancel: &CancellationToken,
    ) -> Result<R>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let request = self.compile(endpoint)?;
        let identity = RequestIdentity::of::<R>(&request);
        let runtime = Handle::try_current().map_err(|e| {
            Error::from(TransportError::Other(format!("no tokio runtime: {}", e)))
        })?;

        let (outcome, attachment) = self.registry.get_or_create(&identity, |guard| {
            self.launch(&runtime, request, identity.clone(), guard, cancel.clone())
        });

        match attachment {
            Attachment::Created => debug!(identity = %identity, "openai-kit request dispatched"),
            Attachment::Joined => debug!(identity = %identity, "openai-kit joined in-flight request"),
        }

        let body = tokio::select! {
            biased;
            result = outcome => result?,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };
        self.codec.decode(&body, 200)
    }

    /// Callback form of [`execute`](Self::execute).
    ///
    /// Errors never cross the callback: they are logged and the callback receives `None`.
    /// Outside a tokio runtime the callback runs immediately with `None` and the returned
    /// handle is `None`.
    pub fn execute_with_callback<R, F>(
        &self,
        endpoint: Endpoint<R>,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        R: DeserializeOwned + Send + 'static,
        F: FnOnce(Option<R>) + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(
                    error_class = "transport_failed",
                    method = endpoint.method.as_str(),
                    path = endpoint.path.as_str(),
                    "openai-kit request not started, no tokio runtime: {}",
                    e
                );
                callback(None);
                return None;
            }
        };

        let client = self.clone();
        Some(runtime.spawn(async move {
            match client.execute(&endpoint).await {
                Ok(value) => callback(Some(value)),
                Err(e) => {
                    warn!(
                        error_class = e.class(),
                        method = endpoint.method.as_str(),
                        path = endpoint.path.as_str(),
                        "openai-kit request failed: {}",
                        e
                    );
                    callback(None)
                }
            }
        }))
    }

    /// Spawn the network operation for a new registry slot.
    ///
    /// Runs under the registry lock: only spawns, never waits.
    fn launch(
        &self,
        runtime: &Handle,
        request: CompiledRequest,
        identity: RequestIdentity,
        guard: SlotGuard,
        cancel: CancellationToken,
    ) -> SharedOutcome {
        let transport = Arc::clone(&self.transport);
        let task = runtime.spawn(async move {
            let client_request_id = Uuid::new_v4().to_string();
            let start = Instant::now();

            let outcome = if cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                    sent = transport.send(&request) => classify(sent),
                }
            };

            match &outcome {
                Ok(body) => info!(
                    identity = %identity,
                    client_request_id = client_request_id.as_str(),
                    method = request.method.as_str(),
                    url = request.url.as_str(),
                    http_status = 200u16,
                    body_len = body.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "openai-kit request completed"
                ),
                Err(e) => warn!(
                    identity = %identity,
                    client_request_id = client_request_id.as_str(),
                    method = request.method.as_str(),
                    url = request.url.as_str(),
                    error_class = e.class(),
                    duration_ms = start.elapsed().as_millis(),
                    "openai-kit request failed: {}",
                    e
                ),
            }

            // Clear the slot before the outcome becomes visible to attached callers.
            drop(guard);
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => Err(Error::Cancelled),
                Err(e) => Err(Error::from(TransportError::Other(format!(
                    "network task failed: {}",
                    e
                )))),
            }
        }
        .boxed()
        .shared()
    }
}

fn classify(sent: std::result::Result<RawResponse, TransportError>) -> Result<Bytes> {
    let response = sent?;
    if response.is_ok() {
        Ok(response.body)
    } else {
        Err(Error::BadResponse {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        })
    }
}

/// Scheme and host every provider endpoint is rooted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientBase {
    pub(crate) scheme: String,
    pub(crate) host: String,
}

impl Default for ClientBase {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
        }
    }
}

impl ClientBase {
    /// Parse `scheme://host[:port]`; any path component is ignored.
    pub(crate) fn parse(base_url: &str) -> Result<Self> {
        let url = url::Url::parse(base_url)
            .map_err(|e| Error::invalid_url(base_url, e.to_string()))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::invalid_url(base_url, "empty host"))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_keeps_port() {
        let base = ClientBase::parse("http://127.0.0.1:4010/ignored").unwrap();
        assert_eq!(base.scheme, "http");
        assert_eq!(base.host, "127.0.0.1:4010");
    }

    #[test]
    fn base_url_without_host_is_invalid() {
        assert!(matches!(
            ClientBase::parse("not a url"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn non_200_is_classified_as_bad_response() {
        let err = classify(Ok(RawResponse::new(404, "missing"))).unwrap_err();
        assert!(matches!(err, Error::BadResponse { status: 404, .. }));
        let ok = classify(Ok(RawResponse::new(200, "{}"))).unwrap();
        assert_eq!(&ok[..], b"{}");
    }
}
