//! The process-wide backend selection, made explicit.
//!
//! A [`BackendConfig`] is built once at startup from the requested family,
//! verified against what the engine actually does, and then passed by
//! reference to everything that derives or signs.

#![forbid(unsafe_code)]

use decv_bip::{DerivationPath, ExtendedKey};
use decv_core::{Error, Result};
use decv_crypto::{canonicalize, BackendFamily, CanonicalSignature, CurveEngine};
use tracing::info;

use crate::oracle::BackendOracle;

pub struct BackendConfig {
    family: BackendFamily,
    engine: Box<dyn CurveEngine>,
}

impl BackendConfig {
    /// Instantiate the requested family and confirm it is the one answering.
    pub fn select(family: BackendFamily) -> Result<Self> {
        Self::with_engine(family, family.engine())
    }

    /// Pin `family` to a specific engine, failing fast if the engine's
    /// observed behavior belongs to the other family or to neither.
    pub fn with_engine(family: BackendFamily, engine: Box<dyn CurveEngine>) -> Result<Self> {
        let observed = BackendOracle::detect(engine.as_ref())?;
        if observed != family {
            return Err(Error::UnrecognizedBackend {
                backend: family.to_string(),
                reason: format!("engine {} behaves like {observed}", engine.name()),
            });
        }

        info!(%family, engine = engine.name(), "backend selected");
        Ok(Self { family, engine })
    }

    pub fn family(&self) -> BackendFamily {
        self.family
    }

    pub fn engine(&self) -> &dyn CurveEngine {
        self.engine.as_ref()
    }

    /// Master key from `seed`, then down `path`.
    pub fn derive(&self, seed: &[u8], path: &DerivationPath) -> Result<ExtendedKey> {
        ExtendedKey::from_seed(self.engine(), seed)?.derive_path(self.engine(), path)
    }

    /// Sign with the active engine and normalize to low-s.
    pub fn sign_canonical(
        &self,
        key: &ExtendedKey,
        digest: &[u8; 32],
    ) -> Result<CanonicalSignature> {
        let raw = key.sign(self.engine(), digest)?;
        canonicalize(&raw, &self.engine().group_order())
    }
}
