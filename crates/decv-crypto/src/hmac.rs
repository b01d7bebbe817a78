//! HMAC-SHA512 (RFC 2104), the PRF behind BIP32 master and child derivation.

#![forbid(unsafe_code)]

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// HMAC-SHA512 of `data` under `key`, as a fixed 64-byte array.
///
/// In BIP32 the key is `"Bitcoin seed"` or a chain code; the left half of
/// the output becomes key material and the right half the chain code.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Compute HMAC-SHA512 over the concatenation of several parts without
/// building the concatenated buffer.
pub fn hmac_sha512_parts(key: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}
