use crate::transport::TransportError;
use std::sync::Arc;
use thiserror::Error;

/// Structured error context for configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Setting or field that caused the error (e.g. "credentials.api_key")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g. expected format)
    pub details: Option<String>,
    /// Source of the error (e.g. "env", "keyring", "builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the client.
///
/// Errors are `Clone` because a single network outcome is delivered to every caller
/// attached to the same in-flight request; underlying causes are held behind `Arc`.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("Failed to serialize request body: {0}")]
    SerializationFailed(#[source] Arc<serde_json::Error>),

    #[error("Bad response: HTTP {status}: {body}")]
    BadResponse { status: u16, body: String },

    #[error("Failed to decode response at '{field_path}': {cause}")]
    DecodeFailed {
        field_path: String,
        #[source]
        cause: Arc<serde_json::Error>,
    },

    #[error("Network transport error: {0}")]
    TransportFailed(#[source] Arc<TransportError>),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case classification, used as a structured logging field.
    pub fn class(&self) -> &'static str {
        match self {
            Error::InvalidUrl { .. } => "invalid_url",
            Error::InvalidHeader { .. } => "invalid_header",
            Error::SerializationFailed(_) => "serialization_failed",
            Error::BadResponse { .. } => "bad_response",
            Error::DecodeFailed { .. } => "decode_failed",
            Error::TransportFailed(_) => "transport_failed",
            Error::Cancelled => "cancelled",
            Error::Configuration { .. } => "configuration",
        }
    }

    /// True for errors raised before anything was sent over the wire.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl { .. } | Error::InvalidHeader { .. } | Error::SerializationFailed(_)
        )
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::TransportFailed(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_formats_context() {
        let err = Error::configuration_with_context(
            "missing API key",
            ErrorContext::new()
                .with_field_path("credentials.api_key")
                .with_source("env"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: missing API key (field: credentials.api_key, source: env)"
        );
        assert_eq!(err.class(), "configuration");
        assert!(err.context().is_some());
    }

    #[test]
    fn bad_response_is_not_a_compile_error() {
        let err = Error::BadResponse {
            status: 404,
            body: "{}".into(),
        };
        assert!(!err.is_compile_error());
        assert!(Error::invalid_url("https://", "empty host").is_compile_error());
    }
}
