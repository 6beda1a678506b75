//! Endpoint-to-request compilation and request identity.

mod compiler;
mod identity;

pub use compiler::compile;
pub use identity::RequestIdentity;

use crate::endpoint::Method;
use bytes::Bytes;
use std::collections::BTreeMap;
use url::Url;

/// A ready-to-send request.
///
/// Header names are lower-cased and kept sorted, so two requests built with headers in
/// different orders compare (and hash) equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRequest {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
}

impl CompiledRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
