// ## 📂 File: `src/headers/decode.rs`
//! src/headers/decode.rs
//!
//! Deploy header decoding.
//!
//! Design notes:
//! - Input is bytecode text, optionally `0x`-prefixed.
//! - A frame is recognized by its hex magic; anything else is plain bytecode.
//! - Once the magic matches, every inconsistency is a hard validation error.

use crate::constants::{DEPLOY_HEADER_V1, MAGIC_DEPLOY};
use crate::headers::types::{DeployHeader, HeaderError};
use crate::utils::strip_0x;

/// Hex text widths of the fixed frame fields.
pub const MAGIC_HEX_LEN: usize = 8;
pub const VERSION_HEX_LEN: usize = 4;
pub const LENGTH_HEX_LEN: usize = 4;
pub const PREFIX_HEX_LEN: usize = MAGIC_HEX_LEN + VERSION_HEX_LEN + LENGTH_HEX_LEN;

/// Bytecode split into its (optional) deploy header and the remaining code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBytecode<'a> {
    pub header: Option<DeployHeader>,
    /// Remaining bytecode text, without `0x`.
    pub payload: &'a str,
}

/// True when `bytecode` starts with a deploy header magic.
pub fn has_deploy_header(bytecode: &str) -> bool {
    strip_0x(bytecode)
        .get(..MAGIC_HEX_LEN)
        .is_some_and(|m| m.eq_ignore_ascii_case(&hex::encode(MAGIC_DEPLOY)))
}

/// Split `bytecode` into deploy header and payload.
///
/// # Returns
/// - `header: None` when no frame is present; `payload` is then the whole body.
/// - `Err(HeaderError)` when a frame is present but cannot be decoded.
pub fn read_deploy_header(bytecode: &str) -> Result<ParsedBytecode<'_>, HeaderError> {
    let body = strip_0x(bytecode);
    if !has_deploy_header(body) {
        return Ok(ParsedBytecode { header: None, payload: body });
    }

    let version_hex = body
        .get(MAGIC_HEX_LEN..MAGIC_HEX_LEN + VERSION_HEX_LEN)
        .ok_or_else(|| HeaderError::MalformedFrame("truncated version field".into()))?;
    let version = parse_u16_hex(version_hex, "version")?;
    if version != DEPLOY_HEADER_V1 {
        return Err(HeaderError::UnsupportedVersion { have: version, need: DEPLOY_HEADER_V1 });
    }

    let length_hex = body
        .get(MAGIC_HEX_LEN + VERSION_HEX_LEN..PREFIX_HEX_LEN)
        .ok_or_else(|| HeaderError::MalformedFrame("truncated length field".into()))?;
    let body_len = parse_u16_hex(length_hex, "length")? as usize;

    let json_end = PREFIX_HEX_LEN + body_len;
    let json = body.get(PREFIX_HEX_LEN..json_end).ok_or_else(|| {
        HeaderError::MalformedFrame(format!(
            "length field {} exceeds available {} bytes",
            body_len,
            body.len() - PREFIX_HEX_LEN
        ))
    })?;

    let header = DeployHeader::from_json(json)
        .map_err(|e| HeaderError::MalformedFrame(format!("header body: {}", e)))?;

    Ok(ParsedBytecode { header: Some(header), payload: &body[json_end..] })
}

fn parse_u16_hex(s: &str, field: &str) -> Result<u16, HeaderError> {
    let mut buf = [0u8; 2];
    hex::decode_to_slice(s, &mut buf)
        .map_err(|e| HeaderError::MalformedFrame(format!("{} field: {}", field, e)))?;
    Ok(u16::from_be_bytes(buf))
}
