use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::constants::{HANDSHAKE_REPLY_SIZE, IDENT};
use crate::error::Error;

/// Wire layout of the handshake reply: the LF-terminated identification
/// literal followed by an XOR checksum over it.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct HandshakeReplyRaw {
    pub ident: [u8; 7],
    pub checksum: u8,
}

/// XOR over all bytes, the firmware's reply integrity check.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Validate a handshake reply and return the identity, LF trimmed.
///
/// Checks run in wire order: size, then identity, then checksum. Exactly
/// one typed error comes back for the first check that fails.
pub fn verify_reply(reply: &[u8]) -> Result<String, Error> {
    let raw = HandshakeReplyRaw::ref_from_bytes(reply).map_err(|_| Error::IncompleteResponse {
        expected: HANDSHAKE_REPLY_SIZE,
        actual: reply.len(),
    })?;

    if raw.ident != *IDENT {
        return Err(Error::IdentityMismatch {
            expected: String::from_utf8_lossy(IDENT).into_owned(),
            actual: String::from_utf8_lossy(&raw.ident).into_owned(),
        });
    }

    let computed = xor_checksum(&raw.ident);
    if computed != raw.checksum {
        return Err(Error::ChecksumMismatch {
            computed,
            received: raw.checksum,
        });
    }

    Ok(String::from_utf8_lossy(&raw.ident).trim_end().to_string())
}
