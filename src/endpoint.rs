//! Declarative endpoint descriptors.

use crate::codec::JsonCodec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOST: &str = "api.openai.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request body that can be encoded by the client's codec.
///
/// Blanket-implemented for every `Serialize` type, so descriptors can hold bodies of any
/// shape without becoming generic over them.
pub trait RequestBody: Send + Sync {
    fn encode(&self, codec: &JsonCodec) -> Result<Vec<u8>, serde_json::Error>;
}

impl<T: Serialize + Send + Sync> RequestBody for T {
    fn encode(&self, codec: &JsonCodec) -> Result<Vec<u8>, serde_json::Error> {
        codec.encode(self)
    }
}

/// Describes one API call. `R` is the response type the call decodes into.
pub struct Endpoint<R> {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub method: Method,
    pub headers: BTreeMap<String, Option<String>>,
    pub body: Option<Arc<dyn RequestBody>>,
    response: PhantomData<fn() -> R>,
}

impl<R> Endpoint<R> {
    /// Endpoint on the default API host.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            path: path.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
            response: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Add a header. A `None` value is kept in the descriptor but never sent.
    pub fn with_header(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.headers.insert(name.into(), value);
        self
    }

    pub fn with_body<B: Serialize + Send + Sync + 'static>(mut self, body: B) -> Self {
        self.body = Some(Arc::new(body));
        self
    }
}

impl<R> Clone for Endpoint<R> {
    fn clone(&self) -> Self {
        Self {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            path: self.path.clone(),
            method: self.method,
            headers: self.headers.clone(),
            body: self.body.clone(),
            response: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Endpoint<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .field("response", &std::any::type_name::<R>())
            .finish()
    }
}
