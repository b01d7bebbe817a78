//! Key fingerprint hashing.

#![forbid(unsafe_code)]

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// RIPEMD160(SHA256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    Ripemd160::digest(sha).into()
}

/// BIP32 key fingerprint: the first four bytes of hash160 of a compressed public key.
pub fn fingerprint(public_key: &[u8; 33]) -> [u8; 4] {
    let h = hash160(public_key);
    [h[0], h[1], h[2], h[3]]
}
