// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Crate-wide error taxonomy.
//!
//! Business errors (`NotFound`, `AlreadyExists`, `DataNotValid`,
//! `OperationNotAllowed`, `TransferNotAllowed`, `AccessDenied`) always carry
//! the specific offending condition in their message and propagate unmodified
//! to the caller, which translates them into transport responses.
//!
//! `CryptoUnavailable` and `DataCorruption` are fatal, non-business failures:
//! they should never occur in normal operation and must not be retried or
//! shown to end users beyond a generic message.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Entity absent for the given identifier (or identifier+owner pairing).
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (username, or card-number blind-index collision).
    #[error("{0}")]
    AlreadyExists(String),

    /// Structurally invalid input caught at the domain layer.
    #[error("{0}")]
    DataNotValid(String),

    /// A state-machine or balance precondition failed.
    #[error("{0}")]
    OperationNotAllowed(String),

    /// A transfer precondition failed.
    #[error("{0}")]
    TransferNotAllowed(String),

    /// Acting identity lacks rights over the resource.
    #[error("{0}")]
    AccessDenied(String),

    /// A cryptographic primitive could not be initialized. Fails closed.
    #[error("crypto unavailable: {0}")]
    CryptoUnavailable(String),

    /// Stored ciphertext could not be decrypted or decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Storage backend fault (I/O, serialization, connectivity).
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists(message.into())
    }

    pub fn data_not_valid(message: impl Into<String>) -> Self {
        Self::DataNotValid(message.into())
    }

    pub fn operation_not_allowed(message: impl Into<String>) -> Self {
        Self::OperationNotAllowed(message.into())
    }

    pub fn transfer_not_allowed(message: impl Into<String>) -> Self {
        Self::TransferNotAllowed(message.into())
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    /// True for the fatal, non-business kinds.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::CryptoUnavailable(_) | Error::DataCorruption(_) | Error::Storage(_)
        )
    }
}
