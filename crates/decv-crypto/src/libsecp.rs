//! Family A: bitcoin-core libsecp256k1 through the `secp256k1` crate.
//!
//! libsecp256k1 signs with an RFC 6979 nonce and always returns the low-s
//! root, so its raw output is already canonical.

#![forbid(unsafe_code)]

use decv_core::{Error, Result};
use secp256k1::{All, Message, PublicKey, Scalar, Secp256k1, SecretKey};

use crate::engine::{CurveEngine, RawSignature};

pub struct Libsecp256k1Engine {
    ctx: Secp256k1<All>,
}

impl Libsecp256k1Engine {
    pub fn new() -> Self {
        Self { ctx: Secp256k1::new() }
    }
}

impl Default for Libsecp256k1Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn secret_key(bytes: &[u8; 32]) -> Result<SecretKey> {
    SecretKey::from_slice(bytes).map_err(|e| Error::InvalidKey(e.to_string()))
}

fn tweak_scalar(bytes: &[u8; 32]) -> Result<Scalar> {
    Scalar::from_be_bytes(*bytes).map_err(|e| Error::InvalidKey(format!("tweak: {e}")))
}

impl CurveEngine for Libsecp256k1Engine {
    fn name(&self) -> &'static str {
        "libsecp256k1"
    }

    fn public_key(&self, secret: &[u8; 32]) -> Result<[u8; 33]> {
        let sk = secret_key(secret)?;
        Ok(PublicKey::from_secret_key(&self.ctx, &sk).serialize())
    }

    fn secret_tweak_add(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> Result<[u8; 32]> {
        let sk = secret_key(secret)?;
        let child = sk
            .add_tweak(&tweak_scalar(tweak)?)
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(child.secret_bytes())
    }

    fn public_tweak_add(&self, public: &[u8; 33], tweak: &[u8; 32]) -> Result<[u8; 33]> {
        let pk = PublicKey::from_slice(public).map_err(|e| Error::InvalidKey(e.to_string()))?;
        let child = pk
            .add_exp_tweak(&self.ctx, &tweak_scalar(tweak)?)
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(child.serialize())
    }

    fn sign_raw(&self, secret: &[u8; 32], digest: &[u8; 32]) -> Result<RawSignature> {
        let sk = secret_key(secret)?;
        let sig = self.ctx.sign_ecdsa(&Message::from_digest(*digest), &sk);
        let compact = sig.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        Ok(RawSignature { r, s })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::is_low_s;
    use crate::engine::SECP256K1_ORDER;

    fn arr(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_pubkey_from_one() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let pubkey = Libsecp256k1Engine::new().public_key(&one).unwrap();
        assert_eq!(
            hex::encode(pubkey),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_zero_secret_rejected() {
        assert!(Libsecp256k1Engine::new().public_key(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_sign_returns_low_s() {
        let engine = Libsecp256k1Engine::new();
        let mut one = [0u8; 32];
        one[31] = 1;
        let digest = arr("a0dc65ffca799873cbea0ac274015b9526505daaaed385155425f7337704883e");
        let sig = engine.sign_raw(&one, &digest).unwrap();
        assert_eq!(
            hex::encode(sig.r),
            "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8"
        );
        assert_eq!(
            hex::encode(sig.s),
            "2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"
        );
        assert!(is_low_s(&sig.s, &SECP256K1_ORDER));
    }

    #[test]
    fn test_tweak_add_rejects_order() {
        let engine = Libsecp256k1Engine::new();
        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(engine.secret_tweak_add(&one, &SECP256K1_ORDER).is_err());
    }
}
