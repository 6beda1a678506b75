use super::CompiledRequest;
use crate::codec::JsonCodec;
use crate::config::Credentials;
use crate::endpoint::Endpoint;
use crate::{Error, Result};
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

pub const ORGANIZATION_HEADER: &str = "openai-organization";

/// Compile an endpoint descriptor into a ready-to-send request.
///
/// Pure: performs no I/O and touches no shared state.
pub fn compile<R>(
    endpoint: &Endpoint<R>,
    credentials: &Credentials,
    codec: &JsonCodec,
) -> Result<CompiledRequest> {
    let url = build_url(&endpoint.scheme, &endpoint.host, &endpoint.path)?;

    let mut merged: Vec<(&str, Option<String>)> = vec![
        ("content-type", Some("application/json".to_string())),
        (
            "authorization",
            Some(format!("Bearer {}", credentials.api_key())),
        ),
        (
            ORGANIZATION_HEADER,
            credentials.organization().map(str::to_string),
        ),
    ];
    // Descriptor headers come last so they override the standard ones.
    merged.extend(
        endpoint
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.clone())),
    );

    let mut headers = BTreeMap::new();
    for (name, value) in merged {
        let name = name.to_ascii_lowercase();
        match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                if HeaderName::from_bytes(name.as_bytes()).is_err()
                    || HeaderValue::from_str(&value).is_err()
                {
                    return Err(Error::InvalidHeader { name });
                }
                headers.insert(name, value);
            }
            // An absent override also suppresses the standard header of that name.
            None => {
                headers.remove(&name);
            }
        }
    }

    let body = match &endpoint.body {
        Some(body) => Some(Bytes::from(
            body.encode(codec)
                .map_err(|e| Error::SerializationFailed(Arc::new(e)))?,
        )),
        None => None,
    };

    Ok(CompiledRequest {
        method: endpoint.method,
        url,
        headers,
        body,
    })
}

fn build_url(scheme: &str, host: &str, path: &str) -> Result<Url> {
    let display = format!("{}://{}{}", scheme, host, path);
    if scheme.is_empty() {
        return Err(Error::invalid_url(display, "empty scheme"));
    }
    if host.is_empty() {
        return Err(Error::invalid_url(display, "empty host"));
    }
    if !path.starts_with('/') {
        return Err(Error::invalid_url(display, "path must start with '/'"));
    }
    if host.contains(|c: char| matches!(c, '/' | '?' | '#' | '@')) {
        return Err(Error::invalid_url(display, "host contains URL delimiters"));
    }

    let origin = format!("{}://{}/", scheme, host);
    let mut url = Url::parse(&origin).map_err(|e| Error::invalid_url(&display, e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
        return Err(Error::invalid_url(display, "empty host"));
    }
    // `?` and `#` in the path are percent-encoded, never split into query or fragment.
    url.set_path(path);
    Ok(url)
}
