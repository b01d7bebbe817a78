//! BIP32 hierarchical deterministic key derivation.
//!
//! Implements master key derivation, child derivation (hardened + normal,
//! private and public), signing, and the `xpub`/`xprv` serializations. All
//! group arithmetic is delegated to a [`CurveEngine`], so the same tree can be
//! walked by either backend and must produce byte-identical keys.

#![forbid(unsafe_code)]

use std::fmt;

use decv_core::{Error, Result};
use decv_crypto::base58::encode_check;
use decv_crypto::hash::fingerprint;
use decv_crypto::hmac::{hmac_sha512, hmac_sha512_parts};
use decv_crypto::{CurveEngine, RawSignature};

use crate::path::{DerivationPath, DerivationStep};

/// Domain separator for master key generation.
const MASTER_KEY_DOMAIN: &[u8] = b"Bitcoin seed";

/// Mainnet public version bytes (`xpub`).
pub const XPUB_VERSION: u32 = 0x0488_B21E;

/// Mainnet private version bytes (`xprv`).
pub const XPRV_VERSION: u32 = 0x0488_ADE4;

/// Serialized extended key length before the Base58Check checksum.
const SERIALIZED_LEN: usize = 78;

/// Extended key: a node of the key tree.
///
/// Private material is optional so that public-only subtrees can be walked;
/// every key created from a seed carries it.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    /// 32-byte private key, absent after [`ExtendedKey::neuter`]
    secret: Option<[u8; 32]>,
    /// 33-byte compressed public key
    public: [u8; 33],
    /// 32-byte chain code
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
}

impl ExtendedKey {
    /// Derive the master key from a seed.
    ///
    /// Uses HMAC-SHA512("Bitcoin seed", seed) per BIP32. Any seed length is
    /// accepted. Fails only if IL is zero or not below n.
    pub fn from_seed(engine: &dyn CurveEngine, seed: &[u8]) -> Result<Self> {
        let hmac = hmac_sha512(MASTER_KEY_DOMAIN, seed);
        let (il, ir) = hmac.split_at(32);

        let mut secret = [0u8; 32];
        secret.copy_from_slice(il);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);
        let public = engine.public_key(&secret)?;

        Ok(Self {
            secret: Some(secret),
            public,
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
        })
    }

    /// Derive the child key for one step.
    ///
    /// For hardened: Data = 0x00 || key || index (needs private material)
    /// For normal:   Data = compressed_pubkey || index
    pub fn derive_child(&self, engine: &dyn CurveEngine, step: DerivationStep) -> Result<Self> {
        let depth = self.depth.checked_add(1).ok_or(Error::DepthOverflow)?;
        let index = step.child_number().to_be_bytes();

        let hmac = if step.is_hardened() {
            let secret = self.secret.as_ref().ok_or(
                Error::HardenedDerivationWithoutPrivateKey {
                    index: step.index(),
                },
            )?;
            hmac_sha512_parts(&self.chain_code, &[&[0x00], secret, &index])
        } else {
            hmac_sha512_parts(&self.chain_code, &[&self.public, &index])
        };
        let (il, ir) = hmac.split_at(32);
        let mut tweak = [0u8; 32];
        tweak.copy_from_slice(il);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        // Child key = IL + parent_key (mod n); the engine rejects IL >= n and a zero result
        let (secret, public) = match &self.secret {
            Some(parent) => {
                let child = engine.secret_tweak_add(parent, &tweak)?;
                (Some(child), engine.public_key(&child)?)
            }
            None => (None, engine.public_tweak_add(&self.public, &tweak)?),
        };

        Ok(Self {
            secret,
            public,
            chain_code,
            depth,
            parent_fingerprint: fingerprint(&self.public),
            child_number: step.child_number(),
        })
    }

    /// Apply every step of `path` in order.
    pub fn derive_path(&self, engine: &dyn CurveEngine, path: &DerivationPath) -> Result<Self> {
        path.iter()
            .try_fold(self.clone(), |key, step| key.derive_child(engine, step))
    }

    /// Drop private material, keeping a key that can only derive normal children.
    pub fn neuter(&self) -> Self {
        Self {
            secret: None,
            ..self.clone()
        }
    }

    pub fn has_private_key(&self) -> bool {
        self.secret.is_some()
    }

    /// Deterministically sign a 32-byte digest, returning the backend's raw (r, s).
    pub fn sign(&self, engine: &dyn CurveEngine, digest: &[u8; 32]) -> Result<RawSignature> {
        let secret = self.secret.as_ref().ok_or(Error::MissingPrivateKey)?;
        engine.sign_raw(secret, digest)
    }

    pub fn public_key(&self) -> &[u8; 33] {
        &self.public
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint(&self.public)
    }

    fn serialize(&self, version: u32, key_bytes: &[u8; 33]) -> String {
        let mut bytes = [0u8; SERIALIZED_LEN];
        bytes[..4].copy_from_slice(&version.to_be_bytes());
        bytes[4] = self.depth;
        bytes[5..9].copy_from_slice(&self.parent_fingerprint);
        bytes[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        bytes[13..45].copy_from_slice(&self.chain_code);
        bytes[45..78].copy_from_slice(key_bytes);
        encode_check(&bytes)
    }

    /// Base58Check `xpub…` identifier.
    pub fn public_identifier(&self) -> String {
        self.serialize(XPUB_VERSION, &self.public)
    }

    /// Base58Check `xprv…` identifier, or `None` for a neutered key.
    pub fn private_identifier(&self) -> Option<String> {
        self.secret.map(|secret| {
            // Add leading `0` byte
            let mut key_bytes = [0u8; 33];
            key_bytes[1..].copy_from_slice(&secret);
            self.serialize(XPRV_VERSION, &key_bytes)
        })
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("public", &self.public_identifier())
            .field("secret", &self.secret.map(|_| "<redacted>"))
            .finish()
    }
}
