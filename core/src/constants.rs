/// Magic marker opening a deploy header frame ("\0sis").
// - Protocol magic field, kept as `[u8; 4]` so the type itself enforces "exactly 4 bytes".
pub const MAGIC_DEPLOY: [u8; 4] = [0x00, 0x73, 0x69, 0x73];
pub const DEPLOY_HEADER_V1: u16 = 1;

/// Largest JSON body the 2-byte length field can describe.
pub const MAX_DEPLOY_BODY_LEN: usize = u16::MAX as usize;

/// Recognized deploy header keys.
pub mod header_keys {
    pub const EXPIRY: &str = "expiry";
    pub const CONFIDENTIAL: &str = "confidential";

    pub const ALL: &[&str] = &[EXPIRY, CONFIDENTIAL];
}

/// SIV-CTR key layout: MAC key || encryption key.
pub const MAC_KEY_LEN: usize = 32;
pub const ENC_KEY_LEN: usize = 16;
pub const SYMMETRIC_KEY_LEN: usize = MAC_KEY_LEN + ENC_KEY_LEN;

/// Truncated synthetic IV length; also the CTR counter block.
pub const TAG_LEN: usize = 16;

/// Nonce length used by the local key manager envelope.
pub const ENVELOPE_NONCE_LEN: usize = 16;

/// Event type the correlation engine subscribes to.
pub const COMPLETED_TRANSACTION_EVENT: &str = "completedTransaction";

/// Default capacity of the invoke command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

pub const ADDRESS_LEN: usize = 20;
pub const HASH_LEN: usize = 32;
