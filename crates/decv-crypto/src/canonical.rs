//! Low-s signature canonicalization and strict DER encoding.
//!
//! ECDSA accepts both (r, s) and (r, n - s). Picking the smaller root gives a
//! representation that does not depend on which backend signed.
//!
//! Scalars are fixed-width big-endian byte arrays, so the derived ordering on
//! `[u8; 32]` is numeric ordering.

#![forbid(unsafe_code)]

use decv_core::{Error, Result};

use crate::engine::RawSignature;

/// `a - b` for big-endian 256-bit values. The caller guarantees `a >= b`.
pub(crate) fn sub_be(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = a[i] as i16 - b[i] as i16 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        result[i] = diff as u8;
    }
    result
}

fn is_zero(x: &[u8; 32]) -> bool {
    x.iter().all(|&b| b == 0)
}

/// Whether `s` is the lower root, i.e. `s <= n - s` (equivalently `2s <= n`).
pub fn is_low_s(s: &[u8; 32], order: &[u8; 32]) -> bool {
    *s <= sub_be(order, s)
}

/// A signature whose s is the low root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicalSignature {
    r: [u8; 32],
    s: [u8; 32],
}

/// Replace s by `min(s, n - s)`.
///
/// Idempotent, and both roots of one signature map to the same result.
/// Fails only when r or s is outside `(0, n)`.
pub fn canonicalize(raw: &RawSignature, order: &[u8; 32]) -> Result<CanonicalSignature> {
    for (name, value) in [("r", &raw.r), ("s", &raw.s)] {
        if is_zero(value) || value >= order {
            return Err(Error::InvalidSignature(format!("{name} is not in (0, n)")));
        }
    }

    let neg_s = sub_be(order, &raw.s);
    let s = if raw.s <= neg_s { raw.s } else { neg_s };

    Ok(CanonicalSignature { r: raw.r, s })
}

/// Minimal DER INTEGER body: strip leading zeros, then re-add one if the
/// high bit would make the value negative.
fn der_integer(value: &[u8; 32]) -> Vec<u8> {
    let first = value.iter().position(|&b| b != 0).unwrap_or(31);
    let mut out = Vec::with_capacity(33);
    if value[first] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(&value[first..]);
    out
}

impl CanonicalSignature {
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    pub fn as_raw(&self) -> RawSignature {
        RawSignature { r: self.r, s: self.s }
    }

    /// Strict DER: 0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>
    pub fn to_der(&self) -> Vec<u8> {
        let rb = der_integer(&self.r);
        let sb = der_integer(&self.s);

        let mut out = Vec::with_capacity(6 + rb.len() + sb.len());
        out.push(0x30);
        out.push((4 + rb.len() + sb.len()) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Lowercase hex of [`Self::to_der`].
    pub fn to_der_hex(&self) -> String {
        hex::encode(self.to_der())
    }
}
