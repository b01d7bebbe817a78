//! Cryptographic building blocks for decv.
//!
//! Curve arithmetic is never done here: it is delegated to one of two
//! independent secp256k1 libraries behind [`engine::CurveEngine`]. This crate
//! adds the hashing and signature canonicalization that sit
//! on top of them.

#![forbid(unsafe_code)]

pub mod base58;
pub mod canonical;
pub mod engine;
pub mod hash;
pub mod hmac;
pub mod libsecp;
pub mod rustcrypto;

pub use canonical::{canonicalize, is_low_s, CanonicalSignature};
pub use engine::{BackendFamily, CurveEngine, RawSignature, SECP256K1_ORDER};
