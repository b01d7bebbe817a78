//! Backend fingerprinting from observed signing output.
//!
//! Both known families sign with an RFC 6979 nonce, so on a fixed input they
//! agree on r and differ only in which s-root they return. The probe input
//! below was chosen so that its unnormalized s is the high root: family A
//! (libsecp256k1) answers with the low root, family B (RustCrypto) with the
//! high one. This only distinguishes those two implementations.

#![forbid(unsafe_code)]

use decv_bip::ExtendedKey;
use decv_core::{Error, Result};
use decv_crypto::{is_low_s, BackendFamily, CurveEngine, RawSignature};
use tracing::debug;

/// Probe key: master key of seed 00 01 .. 0f (BIP32 test vector 1).
const PROBE_SEED: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
    0x0F,
];

/// Probe digest: 00 01 .. 1f.
const PROBE_DIGEST: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
    0x0F, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D,
    0x1E, 0x1F,
];

/// r of the RFC 6979 signature over the probe input.
const PROBE_R: [u8; 32] = [
    0x37, 0xF0, 0x39, 0x33, 0xA1, 0x1F, 0xA0, 0xD4, 0x0F, 0xAD, 0x32, 0x68, 0x64, 0x60, 0x5E,
    0x4B, 0xE4, 0xA7, 0x76, 0xFE, 0xC8, 0xEA, 0x2B, 0x82, 0x0F, 0xE1, 0x1B, 0xAE, 0xBB, 0x44,
    0x6C, 0x57,
];

pub struct BackendOracle;

impl BackendOracle {
    /// Sign the probe digest with the probe key and return the raw signature.
    pub fn probe(engine: &dyn CurveEngine) -> Result<RawSignature> {
        let key = ExtendedKey::from_seed(engine, &PROBE_SEED)?;
        key.sign(engine, &PROBE_DIGEST)
    }

    /// Classify a raw probe signature.
    pub fn classify(
        engine_name: &str,
        raw: &RawSignature,
        order: &[u8; 32],
    ) -> Result<BackendFamily> {
        let unrecognized = |reason: &str| Error::UnrecognizedBackend {
            backend: engine_name.to_string(),
            reason: reason.to_string(),
        };

        if raw.r != PROBE_R {
            return Err(unrecognized("probe r differs from the RFC 6979 signature"));
        }
        if raw.s.iter().all(|&b| b == 0) || raw.s >= *order {
            return Err(unrecognized("probe s is not in (0, n)"));
        }

        Ok(BackendFamily::from_low_s(is_low_s(&raw.s, order)))
    }

    /// Identify which family `engine` behaves like.
    pub fn detect(engine: &dyn CurveEngine) -> Result<BackendFamily> {
        let raw = Self::probe(engine)?;
        let family = Self::classify(engine.name(), &raw, &engine.group_order())?;
        debug!(engine = engine.name(), s = %hex::encode(raw.s), %family, "probed backend");
        Ok(family)
    }
}
