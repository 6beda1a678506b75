use crate::client::core::{ClientBase, OpenAiClient};
use crate::client::inflight::InFlightRegistry;
use crate::codec::JsonCodec;
use crate::config::{Credentials, HttpConfig};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::sync::Arc;

/// Builder for creating clients with custom configuration.
///
/// Anything left unset is resolved at [`build`](Self::build): credentials from the
/// keyring/environment, HTTP settings from the environment, the reqwest transport.
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    http_config: Option<HttpConfig>,
    transport: Option<Arc<dyn Transport>>,
    /// Override the API base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            credentials: None,
            http_config: None,
            transport: None,
            base_url_override: None,
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Shorthand for `credentials(Credentials::new(..))`; fails immediately on a blank key.
    pub fn api_key(self, api_key: impl Into<String>, organization: Option<String>) -> Result<Self> {
        Ok(self.credentials(Credentials::new(api_key, organization)?))
    }

    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = Some(config);
        self
    }

    /// Replace the HTTP stack. The `http_config` setting is ignored when a transport is
    /// supplied.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Root provider endpoints at `scheme://host[:port]` instead of the public API.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<OpenAiClient> {
        let credentials = match self.credentials {
            Some(c) => c,
            None => Credentials::from_env()?,
        };

        let base = match self.base_url_override.as_deref() {
            Some(url) => ClientBase::parse(url)?,
            None => ClientBase::default(),
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => {
                let config = self.http_config.unwrap_or_else(HttpConfig::from_env);
                Arc::new(HttpTransport::new(&config)?)
            }
        };

        Ok(OpenAiClient {
            transport,
            credentials: Arc::new(credentials),
            codec: JsonCodec::new(),
            registry: InFlightRegistry::new(),
            base,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
