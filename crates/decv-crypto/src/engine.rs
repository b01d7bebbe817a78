//! The seam between key-tree policy and the secp256k1 library doing the math.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use decv_core::{Error, Result};

use crate::libsecp::Libsecp256k1Engine;
use crate::rustcrypto::RustCryptoEngine;

/// The secp256k1 group order n, big-endian.
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
pub const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// An ECDSA signature exactly as a backend produced it, before low-s
/// canonicalization. Both scalars are big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// Elliptic-curve operations the key tree and signer need from a backend.
///
/// Secrets are 32-byte big-endian scalars, public keys are 33-byte SEC1
/// compressed points. Every method is deterministic.
pub trait CurveEngine {
    /// Short human-readable backend name.
    fn name(&self) -> &'static str;

    /// Compressed public key for a secret scalar.
    fn public_key(&self, secret: &[u8; 32]) -> Result<[u8; 33]>;

    /// `secret + tweak (mod n)`. Fails if `tweak >= n` or the sum is zero.
    fn secret_tweak_add(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> Result<[u8; 32]>;

    /// `public + tweak*G`. Fails if `tweak >= n` or the sum is the identity.
    fn public_tweak_add(&self, public: &[u8; 33], tweak: &[u8; 32]) -> Result<[u8; 33]>;

    /// RFC 6979 deterministic ECDSA over a 32-byte digest, without any
    /// normalization the caller did not ask for.
    fn sign_raw(&self, secret: &[u8; 32], digest: &[u8; 32]) -> Result<RawSignature>;

    /// The group order n, big-endian.
    fn group_order(&self) -> [u8; 32] {
        SECP256K1_ORDER
    }
}

/// The two known backend behaviors.
///
/// They are told apart only by which s-root they emit on a fixed input, so
/// this enum is closed on purpose: a third family would need its own
/// fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    /// Family A: bitcoin-core libsecp256k1, always emits low-s.
    Libsecp256k1,
    /// Family B: RustCrypto k256 arithmetic, emits whichever root ECDSA yields.
    RustCrypto,
}

impl BackendFamily {
    pub const ALL: [BackendFamily; 2] = [BackendFamily::Libsecp256k1, BackendFamily::RustCrypto];

    /// Whether this family normalizes to low-s on its own.
    pub fn emits_low_s(self) -> bool {
        matches!(self, BackendFamily::Libsecp256k1)
    }

    /// Classify a family from whether a raw probe signature was low-s.
    pub fn from_low_s(low_s: bool) -> Self {
        if low_s {
            BackendFamily::Libsecp256k1
        } else {
            BackendFamily::RustCrypto
        }
    }

    /// Instantiate the engine implementing this family.
    pub fn engine(self) -> Box<dyn CurveEngine> {
        match self {
            BackendFamily::Libsecp256k1 => Box::new(Libsecp256k1Engine::new()),
            BackendFamily::RustCrypto => Box::new(RustCryptoEngine),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendFamily::Libsecp256k1 => "libsecp256k1",
            BackendFamily::RustCrypto => "rustcrypto",
        }
    }
}

impl fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BackendFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| Error::UnrecognizedBackend {
                backend: s.to_string(),
                reason: "no such backend family".to_string(),
            })
    }
}

/// Reject big-endian values outside `[1, n)`.
pub(crate) fn check_scalar(bytes: &[u8; 32], what: &str) -> Result<()> {
    if bytes.iter().all(|&b| b == 0) || *bytes >= SECP256K1_ORDER {
        return Err(Error::InvalidKey(format!("{what} is not in [1, n)")));
    }
    Ok(())
}
