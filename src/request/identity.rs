//! Canonical request identity, used as the in-flight deduplication key.

use super::CompiledRequest;
use sha2::{Digest, Sha256};
use std::any::TypeId;
use std::fmt;

/// Deterministic key for a compiled request and the type it decodes into.
///
/// Hashes method, URL, headers (already lower-cased and sorted), exact body bytes and
/// the response type name. Each component is length-prefixed so adjacent fields cannot
/// alias each other. The response `TypeId` is also part of equality, so two types that
/// happen to share a name never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    hash: String,
    type_id: TypeId,
    response_type: &'static str,
}

impl RequestIdentity {
    pub fn of<R: 'static>(request: &CompiledRequest) -> Self {
        let type_id = TypeId::of::<R>();
        let response_type = std::any::type_name::<R>();
        let mut hasher = Sha256::new();

        put(&mut hasher, b"type", response_type.as_bytes());
        put(&mut hasher, b"type-id", format!("{:?}", type_id).as_bytes());
        put(&mut hasher, b"method", request.method.as_str().as_bytes());
        put(&mut hasher, b"url", request.url.as_str().as_bytes());
        for (name, value) in &request.headers {
            put(&mut hasher, b"header-name", name.as_bytes());
            put(&mut hasher, b"header-value", value.as_bytes());
        }
        match &request.body {
            Some(body) => put(&mut hasher, b"body", body),
            None => put(&mut hasher, b"no-body", b""),
        }

        let hash = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Self {
            hash,
            type_id,
            response_type,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn response_type(&self) -> &'static str {
        self.response_type
    }
}

fn put(hasher: &mut Sha256, tag: &[u8], bytes: &[u8]) {
    hasher.update(tag);
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.hash[..12])
    }
}
