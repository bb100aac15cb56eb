// ## 📂 File: `src/headers/encode.rs`
//! src/headers/encode.rs
//!
//! Deploy header encoding.
//!
//! Design notes:
//! - Frame text = `0x` || hex(MAGIC) || hex(VERSION) || hex(BE16 len) || JSON || payload.
//! - An existing frame is merged into, never stacked.
//! - Writing an empty header onto unframed bytecode returns the input untouched.

use serde_json::Value;
use tracing::debug;

use crate::constants::{DEPLOY_HEADER_V1, MAGIC_DEPLOY, MAX_DEPLOY_BODY_LEN};
use crate::headers::decode::read_deploy_header;
use crate::headers::types::{DeployHeader, HeaderError};
use crate::utils::strip_0x;

/// Stamp `header` onto `bytecode`, merging with any header already present.
///
/// # Returns
/// - `Ok(String)` with the framed bytecode text.
/// - `Err(HeaderError)` for empty bytecode, a malformed existing frame or an
///   oversized header body.
pub fn write_deploy_header(header: &DeployHeader, bytecode: &str) -> Result<String, HeaderError> {
    if strip_0x(bytecode).is_empty() {
        return Err(HeaderError::EmptyBytecode);
    }

    let parsed = read_deploy_header(bytecode)?;
    let mut merged = match parsed.header {
        Some(existing) => existing,
        None if header.is_empty() => return Ok(bytecode.to_string()),
        None => DeployHeader::default(),
    };
    merged.merge(header);

    debug!(expiry = ?merged.expiry, confidential = ?merged.confidential, "writing deploy header");
    encode_frame(&merged, parsed.payload)
}

/// Same as [`write_deploy_header`] for a header given as untyped JSON.
pub fn write_deploy_header_value(header: &Value, bytecode: &str) -> Result<String, HeaderError> {
    if strip_0x(bytecode).is_empty() {
        return Err(HeaderError::EmptyBytecode);
    }
    let header = DeployHeader::from_value(header)?;
    write_deploy_header(&header, bytecode)
}

/// Emit a complete frame for `header` followed by `payload` (bytecode text without `0x`).
pub fn encode_frame(header: &DeployHeader, payload: &str) -> Result<String, HeaderError> {
    let json = header.to_json()?;
    if json.len() > MAX_DEPLOY_BODY_LEN {
        return Err(HeaderError::HeaderTooLarge { len: json.len(), max: MAX_DEPLOY_BODY_LEN });
    }

    let mut out = String::with_capacity(2 + 16 + json.len() + payload.len());
    out.push_str("0x");
    out.push_str(&hex::encode(MAGIC_DEPLOY));
    out.push_str(&hex::encode(DEPLOY_HEADER_V1.to_be_bytes()));
    out.push_str(&hex::encode((json.len() as u16).to_be_bytes()));
    out.push_str(&json);
    out.push_str(payload);
    Ok(out)
}
