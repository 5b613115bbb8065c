// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! The crate-wide error taxonomy.
//!
//! Three failure classes cover everything the engine can hit:
//!
//! - [`DictError::CorruptFormat`] - the file is present but does not decode:
//!   version out of range, sentinel mismatch, bad block checksum, unknown
//!   subtype tag, unresolvable source id.
//! - [`DictError::Io`] - the underlying stream failed to read or write.
//! - [`DictError::InvariantViolation`] - data handed to a constructor breaks
//!   a model invariant (an empty pair side, too many sources).
//!
//! All three abort the in-progress load or save as a whole; a dictionary is
//! never observable in a partially-valid state. Invariant checks are
//! unconditional - corrupt authoring input must fail identically in debug
//! and release builds.

use std::fmt;
use std::io;

/// Error type for dictionary loading, saving, and lookup.
#[derive(Debug)]
pub enum DictError {
    /// The byte stream is structurally invalid for this format.
    CorruptFormat(String),
    /// The underlying reader or writer failed.
    Io(io::Error),
    /// A data-model invariant was violated at construction time.
    InvariantViolation(String),
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictError::CorruptFormat(msg) => write!(f, "corrupt dictionary: {}", msg),
            DictError::Io(err) => write!(f, "i/o failure: {}", err),
            DictError::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for DictError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DictError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DictError {
    fn from(err: io::Error) -> Self {
        DictError::Io(err)
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, DictError>;
