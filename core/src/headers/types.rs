// ## 📂 File: `src/headers/types.rs`

//! headers/types.rs
//! Deploy header record and its validation errors.
//!
//! Notes:
//! - Only `expiry` and `confidential` are recognized; anything else is rejected.
//! - Serialized as compact JSON with `expiry` first; absent fields are omitted.
//! - Frame layout lives in `encode.rs` / `decode.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::header_keys;

/// Metadata stamped in front of contract bytecode at deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployHeader {
    /// Unix time (seconds) after which the contract expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,

    /// Whether calls to the contract must be encrypted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidential: Option<bool>,
}

impl DeployHeader {
    pub fn new(expiry: Option<u64>, confidential: Option<bool>) -> Self {
        Self { expiry, confidential }
    }

    pub fn with_expiry(mut self, expiry: u64) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_confidential(mut self, confidential: bool) -> Self {
        self.confidential = Some(confidential);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expiry.is_none() && self.confidential.is_none()
    }

    /// Field-wise overwrite: fields set in `other` win, the rest are kept.
    pub fn merge(&mut self, other: &DeployHeader) {
        if let Some(expiry) = other.expiry {
            self.expiry = Some(expiry);
        }
        if let Some(confidential) = other.confidential {
            self.confidential = Some(confidential);
        }
    }

    /// Build a header from untyped JSON, rejecting unrecognized keys.
    pub fn from_value(value: &Value) -> Result<Self, HeaderError> {
        let map = value.as_object().ok_or(HeaderError::NotAnObject)?;
        if let Some(unknown) = map.keys().find(|k| !header_keys::ALL.contains(&k.as_str())) {
            return Err(HeaderError::UnknownField { field: unknown.clone() });
        }
        serde_json::from_value(value.clone()).map_err(|e| HeaderError::InvalidField(e.to_string()))
    }

    /// Parse a header from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, HeaderError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| HeaderError::InvalidField(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Compact JSON text of this header.
    pub fn to_json(&self) -> Result<String, HeaderError> {
        serde_json::to_string(self).map_err(|e| HeaderError::Serialize(e.to_string()))
    }

    /// Expiry as a UTC timestamp, if set and representable.
    pub fn expiry_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expiry?).ok()?;
        DateTime::<Utc>::from_timestamp(secs, 0)
    }

    /// True when an expiry is set and `now` is at or past it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_datetime().is_some_and(|expiry| now >= expiry)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Header cannot be written onto empty bytecode.
    #[error("bytecode must not be empty")]
    EmptyBytecode,

    /// Header JSON was not an object.
    #[error("deploy header must be a JSON object")]
    NotAnObject,

    /// Key outside {expiry, confidential}.
    #[error("unrecognized deploy header field: {field}")]
    UnknownField { field: String },

    /// Recognized key with a value of the wrong type.
    #[error("invalid deploy header field: {0}")]
    InvalidField(String),

    /// Frame magic matched but the version is not supported.
    #[error("unsupported deploy header version: have {have}, need {need}")]
    UnsupportedVersion { have: u16, need: u16 },

    /// Existing frame is truncated or inconsistent.
    #[error("malformed deploy header frame: {0}")]
    MalformedFrame(String),

    /// JSON body does not fit the 2-byte length field.
    #[error("deploy header too large: {len} > {max}")]
    HeaderTooLarge { len: usize, max: usize },

    #[error("deploy header serialization failed: {0}")]
    Serialize(String),
}
