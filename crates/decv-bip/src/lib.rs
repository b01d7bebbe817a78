//! BIP32 derivation paths and extended keys.

#![forbid(unsafe_code)]

pub mod path;
pub mod xkey;

pub use path::{DerivationPath, DerivationStep, HARDENED, HARDENED_MARKER};
pub use xkey::ExtendedKey;
