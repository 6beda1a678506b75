//! JSON body encoding and typed response decoding.
//!
//! Wire field names are snake_case, which is also the Rust field convention, so model
//! types map one-to-one; `#[serde(rename = ...)]` covers the few wire names that are not
//! valid identifiers. Timestamps cross the wire as integer milliseconds since the Unix
//! epoch and are decoded with [`chrono::serde::ts_milliseconds`].

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }

    pub fn encode<B: Serialize + ?Sized>(&self, body: &B) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(body)
    }

    /// Decode a response body. Only a 200 response is decoded; anything else is reported
    /// as `BadResponse` without looking at the payload structure.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8], status: u16) -> Result<T> {
        if status != 200 {
            return Err(Error::BadResponse {
                status,
                body: String::from_utf8_lossy(bytes).into_owned(),
            });
        }

        let mut de = serde_json::Deserializer::from_slice(bytes);
        let value: T = serde_path_to_error::deserialize(&mut de).map_err(|e| {
            let field_path = e.path().to_string();
            Error::DecodeFailed {
                field_path,
                cause: Arc::new(e.into_inner()),
            }
        })?;
        de.end().map_err(|e| Error::DecodeFailed {
            field_path: ".".to_string(),
            cause: Arc::new(e),
        })?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Usage {
        prompt_tokens: u32,
        total_tokens: u32,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        id: String,
        #[serde(with = "chrono::serde::ts_milliseconds")]
        created_at: DateTime<Utc>,
        usage: Usage,
    }

    #[test]
    fn decodes_millisecond_timestamps() {
        let body = br#"{"id":"r1","created_at":1674000000123,"usage":{"prompt_tokens":3,"total_tokens":9}}"#;
        let rec: Record = JsonCodec::new().decode(body, 200).unwrap();
        assert_eq!(
            rec.created_at,
            Utc.timestamp_millis_opt(1_674_000_000_123).unwrap()
        );
        assert_eq!(rec.usage.total_tokens, 9);
    }

    #[test]
    fn encode_then_decode_keeps_snake_case_fields() {
        let rec = Record {
            id: "r2".into(),
            created_at: Utc.timestamp_millis_opt(1_000).unwrap(),
            usage: Usage {
                prompt_tokens: 1,
                total_tokens: 2,
            },
        };
        let codec = JsonCodec::new();
        let bytes = codec.encode(&rec).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"created_at\":1000"));
        assert!(text.contains("\"prompt_tokens\":1"));
        let back: Record = codec.decode(&bytes, 200).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn missing_nested_field_reports_path() {
        let body = br#"{"id":"r1","created_at":1,"usage":{"prompt_tokens":3}}"#;
        let err = JsonCodec::new().decode::<Record>(body, 200).unwrap_err();
        match err {
            Error::DecodeFailed { field_path, cause } => {
                assert_eq!(field_path, "usage");
                assert!(cause.to_string().contains("total_tokens"));
            }
            other => panic!("expected DecodeFailed, got {other:?}"),
        }
    }

    #[test]
    fn wrong_primitive_type_reports_path() {
        let body = br#"{"id":"r1","created_at":"yesterday","usage":{"prompt_tokens":3,"total_tokens":4}}"#;
        let err = JsonCodec::new().decode::<Record>(body, 200).unwrap_err();
        match err {
            Error::DecodeFailed { field_path, .. } => assert_eq!(field_path, "created_at"),
            other => panic!("expected DecodeFailed, got {other:?}"),
        }
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let err = JsonCodec::new()
            .decode::<Usage>(br#"{"prompt_tokens":1,"total_tokens":2} tail"#, 200)
            .unwrap_err();
        assert_eq!(err.class(), "decode_failed");
    }

    #[test]
    fn non_200_is_bad_response() {
        let err = JsonCodec::new()
            .decode::<Usage>(br#"{"error":"nope"}"#, 500)
            .unwrap_err();
        match err {
            Error::BadResponse { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("nope"));
            }
            other => panic!("expected BadResponse, got {other:?}"),
        }
    }
}
