//! Derivation paths.
//!
//! Textual form: decimal child indices joined by `/`, hardened steps suffixed
//! with an apostrophe (`0'/5`). The root marker `m` is not part of a path;
//! use [`strip_root_marker`] on strings that may carry one. The `h`/`H`
//! hardening convention is not accepted.

#![forbid(unsafe_code)]

use core::fmt::{self, Display};
use core::str::FromStr;

use decv_core::{Error, Result};

/// Hardened derivation flag.
pub const HARDENED: u32 = 0x80000000;

/// Suffix marking a hardened step.
pub const HARDENED_MARKER: char = '\'';

/// Root marker accepted in front of a path by [`strip_root_marker`].
const ROOT: &str = "m";

fn malformed(path: &str, reason: impl Into<String>) -> Error {
    Error::MalformedPath {
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// One child index plus its hardened flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerivationStep {
    index: u32,
    hardened: bool,
}

impl DerivationStep {
    /// Create a step; `index` must be below 2^31.
    pub fn new(index: u32, hardened: bool) -> Result<Self> {
        if index >= HARDENED {
            return Err(malformed(
                &index.to_string(),
                format!("index {index} is not below 2^31"),
            ));
        }
        Ok(Self { index, hardened })
    }

    /// The non-hardened first child, `0`.
    pub const fn first() -> Self {
        Self {
            index: 0,
            hardened: false,
        }
    }

    /// Same index with the hardened flag replaced.
    pub const fn with_hardened(self, hardened: bool) -> Self {
        Self {
            index: self.index,
            hardened,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The 32-bit child number used in BIP32: `index | HARDENED` for hardened steps.
    pub fn child_number(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl Display for DerivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)?;
        if self.hardened {
            write!(f, "{HARDENED_MARKER}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationStep {
    type Err = Error;

    fn from_str(step: &str) -> Result<Self> {
        if step.is_empty() {
            return Err(malformed(step, "empty segment"));
        }

        let (digits, hardened) = match step.strip_suffix(HARDENED_MARKER) {
            Some(rest) => (rest, true),
            None => (step, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(step, "expected a decimal index"));
        }

        let index: u32 = digits
            .parse()
            .map_err(|_| malformed(step, "index is not below 2^31"))?;

        DerivationStep::new(index, hardened).map_err(|_| malformed(step, "index is not below 2^31"))
    }
}

/// An ordered sequence of steps; the empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DerivationPath {
    steps: Vec<DerivationStep>,
}

impl DerivationPath {
    /// The root path (no descent).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = DerivationStep> + '_ {
        self.steps.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn push(&mut self, step: DerivationStep) {
        self.steps.push(step)
    }
}

impl AsRef<[DerivationStep]> for DerivationPath {
    fn as_ref(&self) -> &[DerivationStep] {
        &self.steps
    }
}

impl From<Vec<DerivationStep>> for DerivationPath {
    fn from(steps: Vec<DerivationStep>) -> Self {
        Self { steps }
    }
}

impl Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<DerivationPath> {
        if path.is_empty() {
            return Ok(DerivationPath::root());
        }

        let steps = path
            .split('/')
            .map(|segment| {
                segment.parse::<DerivationStep>().map_err(|err| match err {
                    Error::MalformedPath { reason, .. } => {
                        malformed(path, format!("segment {segment:?}: {reason}"))
                    }
                    other => other,
                })
            })
            .collect::<Result<_>>()?;

        Ok(DerivationPath { steps })
    }
}

/// Remove a leading `m` or `m/` root marker, if present.
pub fn strip_root_marker(path: &str) -> &str {
    match path.strip_prefix(ROOT) {
        Some("") => "",
        Some(rest) => rest.strip_prefix('/').unwrap_or(path),
        None => path,
    }
}
