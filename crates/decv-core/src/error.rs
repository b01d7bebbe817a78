use std::fmt;

use thiserror::Error;

/// Which serialized extended key a verification mismatch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierField {
    Public,
    Private,
}

impl fmt::Display for IdentifierField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierField::Public => f.write_str("xpub"),
            IdentifierField::Private => f.write_str("xpriv"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed derivation path {path:?}: {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("hardened derivation of child {index}' requires private key material")]
    HardenedDerivationWithoutPrivateKey { index: u32 },

    #[error("operation requires private key material")]
    MissingPrivateKey,

    #[error("maximum derivation depth exceeded")]
    DepthOverflow,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("unrecognized backend {backend}: {reason}")]
    UnrecognizedBackend { backend: String, reason: String },

    #[error("{field} mismatch ({expected} != {computed})")]
    IdentifierMismatch {
        field: IdentifierField,
        expected: String,
        computed: String,
    },

    #[error("sig mismatch ({expected} != {computed})")]
    SignatureMismatch { expected: String, computed: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("invalid generator config: {0}")]
    InvalidConfig(String),

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Strip any line-number wrapping and return the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Error::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}
