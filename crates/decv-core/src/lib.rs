//! Core error types for decv.

#![forbid(unsafe_code)]

mod error;

pub use error::{Error, IdentifierField};

pub type Result<T> = std::result::Result<T, Error>;
