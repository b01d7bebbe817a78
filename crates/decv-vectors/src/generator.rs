//! Random test vector generation.
//!
//! Seeds, paths and digests are random per run; only the signature for a
//! given (key, digest) is deterministic. Records need not be reproducible
//! across runs, just re-derivable by the verifier.

#![forbid(unsafe_code)]

use std::io::Write;
use std::ops::RangeInclusive;

use decv_bip::{DerivationPath, DerivationStep, HARDENED};
use decv_core::{Error, Result};
use rand::{CryptoRng, Rng, RngCore};
use tracing::{debug, info};

use crate::backend::BackendConfig;
use crate::record::TestVectorRecord;

/// Shape of the random records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Seed length range in bytes, inclusive
    seed_len: RangeInclusive<usize>,
    /// Fixed first step of every path
    root_step: DerivationStep,
    /// Random steps appended after the root step: 0..=max_extra_steps
    max_extra_steps: usize,
    /// Largest random child index (inclusive)
    max_index: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed_len: 16..=64,
            root_step: DerivationStep::first(),
            max_extra_steps: 4,
            max_index: 200,
        }
    }
}

impl GeneratorConfig {
    /// Custom bounds. Seeds must be non-empty and `max_index` below 2^31.
    pub fn new(
        min_seed_len: usize,
        max_seed_len: usize,
        max_extra_steps: usize,
        max_index: u32,
    ) -> Result<Self> {
        if min_seed_len == 0 || min_seed_len > max_seed_len {
            return Err(Error::InvalidConfig(format!(
                "seed length range {min_seed_len}..={max_seed_len} is empty or admits empty seeds"
            )));
        }
        if max_index >= HARDENED {
            return Err(Error::InvalidConfig(format!(
                "max index {max_index} is not below 2^31"
            )));
        }

        Ok(Self {
            seed_len: min_seed_len..=max_seed_len,
            max_extra_steps,
            max_index,
            ..Self::default()
        })
    }

    /// Use `0'` instead of `0` as the fixed first step.
    pub fn with_hardened_root(mut self, hardened: bool) -> Self {
        self.root_step = self.root_step.with_hardened(hardened);
        self
    }

    pub fn seed_len(&self) -> &RangeInclusive<usize> {
        &self.seed_len
    }

    pub fn root_step(&self) -> DerivationStep {
        self.root_step
    }

    pub fn max_extra_steps(&self) -> usize {
        self.max_extra_steps
    }

    pub fn max_index(&self) -> u32 {
        self.max_index
    }
}

pub struct VectorGenerator<'a> {
    backend: &'a BackendConfig,
    config: GeneratorConfig,
}

impl<'a> VectorGenerator<'a> {
    pub fn new(backend: &'a BackendConfig, config: GeneratorConfig) -> Self {
        Self { backend, config }
    }

    /// Root step followed by 0..=max_extra_steps steps, each hardened with probability 1/2.
    pub fn random_path<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DerivationPath> {
        let extra = rng.gen_range(0..=self.config.max_extra_steps);
        let mut path = DerivationPath::root();
        path.push(self.config.root_step);
        for _ in 0..extra {
            let index = rng.gen_range(0..=self.config.max_index);
            path.push(DerivationStep::new(index, rng.gen_bool(0.5))?);
        }
        Ok(path)
    }

    /// Build the record for fixed inputs. Deterministic.
    pub fn record_for(
        &self,
        seed: &[u8],
        path: &DerivationPath,
        digest: [u8; 32],
    ) -> Result<TestVectorRecord> {
        let key = self.backend.derive(seed, path)?;
        let signature = self.backend.sign_canonical(&key, &digest)?;

        Ok(TestVectorRecord {
            seed: seed.to_vec(),
            path: path.clone(),
            public_identifier: key.public_identifier(),
            private_identifier: key.private_identifier().ok_or(Error::MissingPrivateKey)?,
            digest,
            signature_hex: signature.to_der_hex(),
        })
    }

    /// Draw a random seed, path and digest and build their record.
    pub fn generate<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<TestVectorRecord> {
        let seed_len = rng.gen_range(self.config.seed_len.clone());
        let mut seed = vec![0u8; seed_len];
        rng.fill_bytes(&mut seed);

        let path = self.random_path(rng)?;

        let mut digest = [0u8; 32];
        rng.fill_bytes(&mut digest);

        let record = self.record_for(&seed, &path, digest)?;
        debug!(seed_len, %path, "generated record");
        Ok(record)
    }

    /// Write `count` records, one per line, calling `on_record` after each.
    pub fn write_records<R, W>(
        &self,
        rng: &mut R,
        count: u64,
        out: &mut W,
        mut on_record: impl FnMut(u64),
    ) -> Result<u64>
    where
        R: RngCore + CryptoRng,
        W: Write,
    {
        for i in 0..count {
            let record = self.generate(rng)?;
            writeln!(out, "{record}")?;
            on_record(i + 1);
        }
        out.flush()?;

        info!(count, family = %self.backend.family(), "generated records");
        Ok(count)
    }
}
