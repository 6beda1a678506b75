//! Client configuration: API credentials and HTTP transport knobs.

use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use std::env;
use std::fmt;
use std::time::Duration;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ORGANIZATION_ENV: &str = "OPENAI_ORGANIZATION";

const KEYRING_SERVICE: &str = "openai";
const KEYRING_USER: &str = "api_key";

/// API credentials, loaded once when the client is built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    organization: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, organization: Option<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "API key must not be empty",
                ErrorContext::new()
                    .with_field_path("credentials.api_key")
                    .with_source("credentials"),
            ));
        }
        Ok(Self {
            api_key,
            organization: non_blank(organization),
        })
    }

    /// Resolve credentials from the OS keyring and the environment.
    ///
    /// The API key comes from the keyring entry (`openai` / `api_key`) if present,
    /// otherwise from `OPENAI_API_KEY`. The organization comes from
    /// `OPENAI_ORGANIZATION`.
    pub fn from_env() -> Result<Self> {
        Self::resolve(keyring_api_key(), |name| env::var(name).ok())
    }

    fn resolve(
        keyring_key: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = non_blank(keyring_key)
            .or_else(|| non_blank(lookup(API_KEY_ENV)))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "missing API key",
                    ErrorContext::new()
                        .with_field_path("credentials.api_key")
                        .with_details(format!("set {} or a keyring entry", API_KEY_ENV))
                        .with_source("env"),
                )
            })?;
        Self::new(api_key, lookup(ORGANIZATION_ENV))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

fn keyring_api_key() -> Option<String> {
    Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .ok()
        .and_then(|entry| entry.get_password().ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Settings for the default reqwest transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            proxy_url: None,
        }
    }
}

impl HttpConfig {
    /// Defaults, overridable via `OPENAI_HTTP_TIMEOUT_SECS` and `OPENAI_PROXY_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = env::var("OPENAI_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        Self {
            timeout,
            proxy_url: non_blank(env::var("OPENAI_PROXY_URL").ok()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = Credentials::new("   ", None).unwrap_err();
        assert_eq!(err.class(), "configuration");
    }

    #[test]
    fn blank_organization_is_treated_as_absent() {
        let creds = Credentials::new("sk-test", Some(String::new())).unwrap();
        assert_eq!(creds.organization(), None);
    }

    #[test]
    fn keyring_value_wins_over_env() {
        let creds = Credentials::resolve(
            Some("sk-keyring".into()),
            lookup(&[(API_KEY_ENV, "sk-env"), (ORGANIZATION_ENV, "org-1")]),
        )
        .unwrap();
        assert_eq!(creds.api_key(), "sk-keyring");
        assert_eq!(creds.organization(), Some("org-1"));
    }

    #[test]
    fn env_is_used_without_keyring() {
        let creds = Credentials::resolve(None, lookup(&[(API_KEY_ENV, "sk-env")])).unwrap();
        assert_eq!(creds.api_key(), "sk-env");
        assert_eq!(creds.organization(), None);
    }

    #[test]
    fn missing_key_reports_field() {
        let err = Credentials::resolve(None, lookup(&[])).unwrap_err();
        let ctx = err.context().unwrap();
        assert_eq!(ctx.field_path.as_deref(), Some("credentials.api_key"));
    }

    #[test]
    fn debug_output_redacts_key() {
        let creds = Credentials::new("sk-secret", None).unwrap();
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
