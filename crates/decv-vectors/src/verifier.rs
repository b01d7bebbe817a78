//! Re-derive every recorded expectation and demand exact equality.
//!
//! Verification is fail-fast: the first malformed or mismatching record
//! aborts the run.

#![forbid(unsafe_code)]

use std::io::BufRead;

use decv_core::{Error, IdentifierField, Result};
use tracing::{debug, info};

use crate::backend::BackendConfig;
use crate::record::TestVectorRecord;

pub struct VectorVerifier<'a> {
    backend: &'a BackendConfig,
}

impl<'a> VectorVerifier<'a> {
    pub fn new(backend: &'a BackendConfig) -> Self {
        Self { backend }
    }

    /// Check one record: public identifier, then private identifier, then signature.
    pub fn verify_record(&self, record: &TestVectorRecord) -> Result<()> {
        let key = self.backend.derive(&record.seed, &record.path)?;

        let xpub = key.public_identifier();
        if xpub != record.public_identifier {
            return Err(Error::IdentifierMismatch {
                field: IdentifierField::Public,
                expected: record.public_identifier.clone(),
                computed: xpub,
            });
        }

        let xprv = key.private_identifier().ok_or(Error::MissingPrivateKey)?;
        if xprv != record.private_identifier {
            return Err(Error::IdentifierMismatch {
                field: IdentifierField::Private,
                expected: record.private_identifier.clone(),
                computed: xprv,
            });
        }

        let signature = self.backend.sign_canonical(&key, &record.digest)?.to_der_hex();
        if signature != record.signature_hex {
            return Err(Error::SignatureMismatch {
                expected: record.signature_hex.clone(),
                computed: signature,
            });
        }

        Ok(())
    }

    /// Verify every record in `input`, one per line.
    ///
    /// Trailing whitespace is ignored and blank lines are skipped. Errors
    /// carry the 1-based line number.
    /// `on_record` is called with the running count after each success.
    pub fn verify_lines<R: BufRead>(
        &self,
        input: R,
        mut on_record: impl FnMut(u64),
    ) -> Result<u64> {
        let mut verified = 0u64;

        for (idx, line) in input.lines().enumerate() {
            let line_no = idx + 1;
            let at_line = |source: Error| Error::AtLine {
                line: line_no,
                source: Box::new(source),
            };

            let line = line.map_err(|e| at_line(e.into()))?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let record: TestVectorRecord = line.parse().map_err(at_line)?;
            self.verify_record(&record).map_err(at_line)?;

            verified += 1;
            debug!(line = line_no, path = %record.path, "record verified");
            on_record(verified);
        }

        info!(verified, family = %self.backend.family(), "verification complete");
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GeneratorConfig, VectorGenerator};
    use decv_bip::DerivationPath;
    use decv_crypto::BackendFamily;

    const LINE: &str = "00010203040506070809,0'/5,\
        xpub6Ab59TERT741pHnwrDYkfQyrDVD2Kx3rQpVK1a98mbKzCLh74ooqqBk5F4isvH79DDtBq1TeztpXsNmC1rp632GN8t1vbJqtYdVK22EYCNs,\
        xprv9wbijwhXcjViboiUkC1kJH37fTNXvVL13bZiDBjXDFo1KYMxXGVbHPRbPmP732FZ8mCUF4RcXfDRrptYFS6hEZr9b39UEcf2xEnEBLEPqtC,\
        0000000000000000000000000000000000000000000000000000000000000000,\
        30450221009271cf294b4a9e222df2250463f5ec99df544febe97b8e81119f80ea5fd70c06022058e3c84dbf0c95f795f602ba35c08fd3a42ec81a53bbafe5f80537fd9e13ec1e";

    fn record() -> TestVectorRecord {
        LINE.parse().unwrap()
    }

    /// Replace one hex digit with a different one.
    fn flip(s: &str, at: usize) -> String {
        let mut chars: Vec<char> = s.chars().collect();
        chars[at] = if chars[at] == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_concrete_example_both_backends() {
        for family in BackendFamily::ALL {
            let backend = BackendConfig::select(family).unwrap();
            VectorVerifier::new(&backend).verify_record(&record()).unwrap();
        }
    }

    #[test]
    fn test_tampered_signature() {
        let backend = BackendConfig::select(BackendFamily::RustCrypto).unwrap();
        let verifier = VectorVerifier::new(&backend);

        for at in [0, 10, 80, 141] {
            let mut tampered = record();
            tampered.signature_hex = flip(&tampered.signature_hex, at);
            let err = verifier.verify_record(&tampered).unwrap_err();
            assert!(matches!(err, Error::SignatureMismatch { .. }), "{err}");
        }
    }

    #[test]
    fn test_tampered_identifiers() {
        let backend = BackendConfig::select(BackendFamily::Libsecp256k1).unwrap();
        let verifier = VectorVerifier::new(&backend);

        let mut tampered = record();
        tampered.public_identifier.push('x');
        let err = verifier.verify_record(&tampered).unwrap_err();
        assert!(matches!(
            err,
            Error::IdentifierMismatch {
                field: IdentifierField::Public,
                ..
            }
        ));

        let mut tampered = record();
        tampered.private_identifier = tampered.private_identifier.replace('w', "W");
        let err = verifier.verify_record(&tampered).unwrap_err();
        assert!(matches!(
            err,
            Error::IdentifierMismatch {
                field: IdentifierField::Private,
                ..
            }
        ));
    }

    #[test]
    fn test_swapped_hardening_is_identifier_mismatch() {
        let backend = BackendConfig::select(BackendFamily::Libsecp256k1).unwrap();
        let mut swapped = record();
        swapped.path = "0/5'".parse::<DerivationPath>().unwrap();

        let err = VectorVerifier::new(&backend).verify_record(&swapped).unwrap_err();
        assert!(matches!(err, Error::IdentifierMismatch { .. }), "{err}");
    }

    #[test]
    fn test_verify_lines_skips_blank_and_crlf() {
        let backend = BackendConfig::select(BackendFamily::RustCrypto).unwrap();
        let input = format!("{LINE}\r\n\n{LINE}\n   \n");
        let mut seen = Vec::new();

        let count = VectorVerifier::new(&backend)
            .verify_lines(input.as_bytes(), |n| seen.push(n))
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_verify_lines_ignores_trailing_whitespace() {
        let backend = BackendConfig::select(BackendFamily::Libsecp256k1).unwrap();
        let input = format!("{LINE} \n{LINE}\t\n{LINE} \t \r\n");

        let count = VectorVerifier::new(&backend)
            .verify_lines(input.as_bytes(), |_| {})
            .unwrap();

        assert_eq!(count, 3);
    }

    #[test]
    fn test_verify_lines_empty_input() {
        let backend = BackendConfig::select(BackendFamily::RustCrypto).unwrap();
        let count = VectorVerifier::new(&backend)
            .verify_lines(&b""[..], |_| {})
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_verify_lines_reports_line_number() {
        let backend = BackendConfig::select(BackendFamily::Libsecp256k1).unwrap();
        let bad = LINE.replacen("0'/5", "0'/x", 1);
        let input = format!("{LINE}\n\n{bad}\n{LINE}\n");

        let err = VectorVerifier::new(&backend)
            .verify_lines(input.as_bytes(), |_| {})
            .unwrap_err();

        assert!(matches!(err, Error::AtLine { line: 3, .. }), "{err}");
        assert!(matches!(err.root(), Error::MalformedPath { .. }));
        assert!(err.to_string().starts_with("line 3: "));
    }

    #[test]
    fn test_generated_records_verify() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha20Rng;

        let backend = BackendConfig::select(BackendFamily::Libsecp256k1).unwrap();
        let generator = VectorGenerator::new(&backend, GeneratorConfig::default());
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        let mut out = Vec::new();
        generator.write_records(&mut rng, 8, &mut out, |_| {}).unwrap();

        let count = VectorVerifier::new(&backend)
            .verify_lines(out.as_slice(), |_| {})
            .unwrap();
        assert_eq!(count, 8);
    }
}
