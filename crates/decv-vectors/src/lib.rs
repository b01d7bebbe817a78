//! Deterministic ECDSA test vectors: generation, backend fingerprinting and
//! cross-backend verification.

#![forbid(unsafe_code)]

pub mod backend;
pub mod generator;
pub mod oracle;
pub mod record;
pub mod verifier;

pub use backend::BackendConfig;
pub use generator::{GeneratorConfig, VectorGenerator};
pub use oracle::BackendOracle;
pub use record::TestVectorRecord;
pub use verifier::VectorVerifier;
