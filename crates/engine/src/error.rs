//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`EngineError`] thrown when user input cannot become a ledger value.
//! - [`StoreError`] thrown when the ledger document cannot be read or written.
//! - [`ValidationError`] thrown when command arguments are rejected.
//! - [`DispatchError`] the terminal error of a single command request.
//!
//! [`LoadError`] keeps the empty ledger a failed load falls back to. The
//! dispatcher only reports the cause; transports that still want to show
//! something can render the fallback.
use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{Ledger, Money};

/// Engine custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("amount too large")]
    AmountTooLarge,
    #[error("ledger totals would exceed the largest representable amount")]
    TotalsOverflow,
}

/// Failures of the ledger storage medium.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed ledger document: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("cannot encode ledger document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A failed load. Carries the empty ledger callers fall back to.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct LoadError {
    fallback: Ledger,
    #[source]
    source: StoreError,
}

impl LoadError {
    pub(crate) fn new(source: StoreError) -> Self {
        Self {
            fallback: Ledger::default(),
            source,
        }
    }

    /// The ledger to use in place of the unreadable one. Always empty.
    pub fn fallback(&self) -> &Ledger {
        &self.fallback
    }

    pub fn into_parts(self) -> (Ledger, StoreError) {
        (self.fallback, self.source)
    }
}

impl From<LoadError> for StoreError {
    fn from(err: LoadError) -> Self {
        err.source
    }
}

/// Malformed or missing command arguments. The ledger is never touched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("wrong arguments, usage: {usage}")]
    Usage { usage: String },
    #[error(transparent)]
    Amount(#[from] EngineError),
    #[error("amount must be greater than zero, got {0}")]
    NotPositive(Money),
}

/// Why a command request ended without an outcome.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("caller is not allowed to use the ledger")]
    PermissionDenied,
    #[error("unrecognized command \"{token}\"")]
    UnrecognizedCommand {
        token: String,
        /// How to reach the help listing, when help is enabled.
        help: Option<String>,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<LoadError> for DispatchError {
    fn from(err: LoadError) -> Self {
        Self::Storage(err.into())
    }
}
