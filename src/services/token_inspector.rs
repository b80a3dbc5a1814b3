// src/services/token_inspector.rs
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;

use crate::models::jwt::TokenPayload;
use crate::utils::clock::Clock;

/// Why a token's payload could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token is empty")]
    Empty,
    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),
    #[error("payload is not valid base64: {0}")]
    Base64(String),
    #[error("payload is not valid JSON: {0}")]
    Json(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Reads token payloads. Signatures are never checked, so nothing returned
/// here may be trusted for authorization.
#[derive(Clone)]
pub struct TokenInspector {
    clock: Arc<dyn Clock>,
}

impl TokenInspector {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Decodes the payload segment. Both the URL-safe and the standard base64
    /// alphabets are read, with or without padding.
    pub fn decode(token: &str) -> Result<TokenPayload, DecodeError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DecodeError::Empty);
        }

        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(DecodeError::SegmentCount(segments.len()));
        }

        let segment = segments[1].trim_end_matches('=').replace('+', "-").replace('/', "_");
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| DecodeError::Base64(e.to_string()))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(claims)) => Ok(TokenPayload::new(claims)),
            Ok(_) => Err(DecodeError::NotAnObject),
            Err(e) => Err(DecodeError::Json(e.to_string())),
        }
    }

    /// Payload of `token`, or `None` when there is no token or it is malformed.
    pub fn payload(token: Option<&str>) -> Option<TokenPayload> {
        match Self::decode(token?) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(error = %e, "Ignoring undecodable token");
                None
            }
        }
    }

    /// Fail-closed: no token, a malformed token or a missing numeric `exp`
    /// all count as expired.
    pub fn is_expired(&self, token: Option<&str>) -> bool {
        Self::payload(token).is_none_or(|payload| self.is_payload_expired(&payload))
    }

    pub fn is_payload_expired(&self, payload: &TokenPayload) -> bool {
        match payload.exp() {
            Some(exp) => exp * 1000.0 <= self.clock.now_millis() as f64,
            None => true,
        }
    }

    pub fn expires_at(payload: &TokenPayload) -> Option<OffsetDateTime> {
        let exp = payload.exp()?;
        OffsetDateTime::from_unix_timestamp(exp.floor() as i64).ok()
    }
}
