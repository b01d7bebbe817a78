//! One test vector per line:
//!
//! `seed_hex,path,xpub,xprv,digest_hex,signature_der_hex`
//!
//! The path carries no root marker; a leading `m/` written by older tooling
//! is tolerated on input.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use decv_bip::path::strip_root_marker;
use decv_bip::DerivationPath;
use decv_core::{Error, Result};

const FIELDS: usize = 6;

/// An immutable, self-describing test vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVectorRecord {
    pub seed: Vec<u8>,
    pub path: DerivationPath,
    pub public_identifier: String,
    pub private_identifier: String,
    pub digest: [u8; 32],
    /// Hex of the canonical DER signature, kept as text so verification
    /// compares exactly what was written.
    pub signature_hex: String,
}

fn decode_hex(field: &str, name: &str) -> Result<Vec<u8>> {
    hex::decode(field).map_err(|e| Error::MalformedRecord(format!("{name}: {e}")))
}

fn non_empty<'a>(field: &'a str, name: &str) -> Result<&'a str> {
    if field.is_empty() {
        return Err(Error::MalformedRecord(format!("{name} is empty")));
    }
    Ok(field)
}

impl fmt::Display for TestVectorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            hex::encode(&self.seed),
            self.path,
            self.public_identifier,
            self.private_identifier,
            hex::encode(self.digest),
            self.signature_hex
        )
    }
}

impl FromStr for TestVectorRecord {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        let &[seed, path, xpub, xprv, digest, sig] = fields.as_slice() else {
            return Err(Error::MalformedRecord(format!(
                "expected {FIELDS} comma-separated fields, found {}",
                fields.len()
            )));
        };

        let seed = decode_hex(seed, "seed")?;
        let path: DerivationPath = strip_root_marker(path).parse()?;

        let digest: [u8; 32] = decode_hex(digest, "digest")?
            .try_into()
            .map_err(|bytes: Vec<u8>| {
                Error::MalformedRecord(format!("digest is {} bytes, expected 32", bytes.len()))
            })?;

        decode_hex(non_empty(sig, "signature")?, "signature")?;

        Ok(Self {
            seed,
            path,
            public_identifier: non_empty(xpub, "xpub")?.to_string(),
            private_identifier: non_empty(xprv, "xpriv")?.to_string(),
            digest,
            signature_hex: sig.to_string(),
        })
    }
}
