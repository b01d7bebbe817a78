//! Family B: RustCrypto's `k256` with the raw ECDSA primitive.
//!
//! The nonce is RFC 6979 over HMAC-SHA256, so r always matches family A.
//! Signing goes through `ecdsa::hazmat::sign_prehashed`, which leaves s
//! unnormalized: roughly half the time it is the high root.

#![forbid(unsafe_code)]

use decv_core::{Error, Result};
use ecdsa::hazmat::sign_prehashed;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, ProjectivePoint, PublicKey, Scalar, Secp256k1, U256};
use sha2::Sha256;

use crate::engine::{check_scalar, CurveEngine, RawSignature, SECP256K1_ORDER};

#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoEngine;

fn scalar(bytes: &[u8; 32], what: &str) -> Result<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes)))
        .ok_or_else(|| Error::InvalidKey(format!("{what} is not below n")))
}

fn secret_scalar(secret: &[u8; 32]) -> Result<Scalar> {
    check_scalar(secret, "secret key")?;
    scalar(secret, "secret key")
}

/// SEC1 compressed encoding; the identity has no 33-byte form.
fn compress(point: ProjectivePoint) -> Result<[u8; 33]> {
    let encoded = point.to_affine().to_encoded_point(true);
    encoded
        .as_bytes()
        .try_into()
        .map_err(|_| Error::InvalidKey("point at infinity".to_string()))
}

/// RFC 6979 nonce k for signing `digest` with `secret`.
fn nonce(secret: &[u8; 32], digest: &[u8; 32]) -> [u8; 32] {
    // bits2octets: the digest reduced mod n
    let h = <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*digest));
    rfc6979::generate_k::<Sha256, _>(
        &FieldBytes::from(*secret),
        &FieldBytes::from(SECP256K1_ORDER),
        &h.to_repr(),
        &[],
    )
    .into()
}

impl CurveEngine for RustCryptoEngine {
    fn name(&self) -> &'static str {
        "rustcrypto"
    }

    fn public_key(&self, secret: &[u8; 32]) -> Result<[u8; 33]> {
        let d = secret_scalar(secret)?;
        compress(ProjectivePoint::GENERATOR * d)
    }

    fn secret_tweak_add(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> Result<[u8; 32]> {
        let d = secret_scalar(secret)?;
        let t = scalar(tweak, "tweak")?;

        let child = d + t;
        if bool::from(child.is_zero()) {
            return Err(Error::InvalidKey("derived key is zero".to_string()));
        }
        Ok(child.to_repr().into())
    }

    fn public_tweak_add(&self, public: &[u8; 33], tweak: &[u8; 32]) -> Result<[u8; 33]> {
        let parent =
            PublicKey::from_sec1_bytes(public).map_err(|e| Error::InvalidKey(e.to_string()))?;
        let t = scalar(tweak, "tweak")?;
        compress(parent.to_projective() + ProjectivePoint::GENERATOR * t)
    }

    fn sign_raw(&self, secret: &[u8; 32], digest: &[u8; 32]) -> Result<RawSignature> {
        let d = secret_scalar(secret)?;
        let k = scalar(&nonce(secret, digest), "nonce")?;

        let z = FieldBytes::from(*digest);
        let (signature, _) = sign_prehashed::<Secp256k1, Scalar>(&d, k, &z)
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;
        let (r, s) = signature.split_bytes();

        Ok(RawSignature {
            r: r.into(),
            s: s.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{canonicalize, is_low_s};
    use crate::libsecp::Libsecp256k1Engine;

    fn arr(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    const SECRETS: [&str; 4] = [
        "0000000000000000000000000000000000000000000000000000000000000001",
        "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35",
        "deadbeefcafebabedeadbeefcafebabedeadbeefcafebabedeadbeefcafebabe",
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140", // n-1
    ];

    #[test]
    fn test_nonce_private_key_one_satoshi_nakamoto() {
        // Widely published secp256k1 RFC 6979 vector: d = 1, m = "Satoshi Nakamoto"
        let digest = arr("a0dc65ffca799873cbea0ac274015b9526505daaaed385155425f7337704883e");
        assert_eq!(
            hex::encode(nonce(&arr(SECRETS[0]), &digest)),
            "8f8a276c19f4149656b280621e358cce24f5f52542772691ee69063b74f15d15"
        );
    }

    #[test]
    fn test_nonce_with_leading_zero_byte() {
        // BIP32 test vector 1 master key signing 00 01 .. 1f
        let digest: [u8; 32] = core::array::from_fn(|i| i as u8);
        assert_eq!(
            hex::encode(nonce(&arr(SECRETS[1]), &digest)),
            "0d30e31308282930defba94f209d8a2c1084f762e6bc62b0ce9f73ca935efa58"
        );
    }

    #[test]
    fn test_nonce_deterministic() {
        let secret = arr(SECRETS[2]);
        let digest = [0xffu8; 32];
        assert_eq!(nonce(&secret, &digest), nonce(&secret, &digest));
        assert_ne!(nonce(&secret, &digest), nonce(&secret, &[0u8; 32]));
    }

    #[test]
    fn test_sign_returns_raw_high_s() {
        // Same vector as the libsecp256k1 test, but the unnormalized root
        let mut one = [0u8; 32];
        one[31] = 1;
        let digest = arr("a0dc65ffca799873cbea0ac274015b9526505daaaed385155425f7337704883e");
        let sig = RustCryptoEngine.sign_raw(&one, &digest).unwrap();
        assert_eq!(
            hex::encode(sig.r),
            "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8"
        );
        assert_eq!(
            hex::encode(sig.s),
            "dbbd3162d46e9f9bef7feb87c16dc13b4f6568a87f4e83f728e2443ba586675c"
        );
        assert!(!is_low_s(&sig.s, &SECP256K1_ORDER));
    }

    #[test]
    fn test_public_keys_match_libsecp256k1() {
        let other = Libsecp256k1Engine::new();
        for hex_k in SECRETS {
            let k = arr(hex_k);
            assert_eq!(
                RustCryptoEngine.public_key(&k).unwrap(),
                other.public_key(&k).unwrap(),
                "pubkey mismatch for k = {hex_k}"
            );
        }
    }

    #[test]
    fn test_tweaks_match_libsecp256k1() {
        let other = Libsecp256k1Engine::new();
        let tweak = arr("1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef");
        for hex_k in SECRETS {
            let k = arr(hex_k);
            let ours = RustCryptoEngine.secret_tweak_add(&k, &tweak).unwrap();
            assert_eq!(ours, other.secret_tweak_add(&k, &tweak).unwrap());

            let public = other.public_key(&k).unwrap();
            let ours_pub = RustCryptoEngine.public_tweak_add(&public, &tweak).unwrap();
            assert_eq!(ours_pub, other.public_tweak_add(&public, &tweak).unwrap());
            assert_eq!(ours_pub, other.public_key(&ours).unwrap());
        }
    }

    #[test]
    fn test_signatures_agree_after_canonicalization() {
        let other = Libsecp256k1Engine::new();
        for hex_k in SECRETS {
            let k = arr(hex_k);
            for fill in [0x00u8, 0x5a, 0xff] {
                let digest = [fill; 32];
                let ours = RustCryptoEngine.sign_raw(&k, &digest).unwrap();
                let theirs = other.sign_raw(&k, &digest).unwrap();
                assert_eq!(ours.r, theirs.r);
                assert_eq!(
                    canonicalize(&ours, &SECP256K1_ORDER).unwrap(),
                    canonicalize(&theirs, &SECP256K1_ORDER).unwrap(),
                    "signature mismatch for k = {hex_k}, digest fill {fill:02x}"
                );
            }
        }
    }

    #[test]
    fn test_tweak_to_zero_rejected() {
        // (n-1) + 1 = 0 mod n
        let n_minus_one = arr(SECRETS[3]);
        let one = arr(SECRETS[0]);
        assert!(RustCryptoEngine.secret_tweak_add(&n_minus_one, &one).is_err());
    }
}
