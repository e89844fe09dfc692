// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! # Runtime Configuration
//!
//! This module defines the environment variable names and the configuration
//! struct consumed once at process start. Key material derived from these
//! secrets is immutable for the lifetime of the process; rotating any of
//! them invalidates previously stored ciphertexts and blind indexes.
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `CARD_ENCRYPTION_PASSWORD` | Password the AES-256 card-number key is derived from |
//! | `CARD_ENCRYPTION_SALT` | Salt mixed into the key derivation |
//! | `CARD_HASHER_SECRET` | Independent HMAC secret for the blind index |
//!
//! The three secrets are independent; none may be derived from another, so
//! that compromise of one does not compromise the guarantees of the others
//! (confidentiality vs. lookup integrity).

use std::env;

use crate::error::{Error, Result};

/// Environment variable holding the encryption password.
pub const ENCRYPTION_PASSWORD_ENV: &str = "CARD_ENCRYPTION_PASSWORD";

/// Environment variable holding the encryption salt.
pub const ENCRYPTION_SALT_ENV: &str = "CARD_ENCRYPTION_SALT";

/// Environment variable holding the blind-index HMAC secret.
pub const HASHER_SECRET_ENV: &str = "CARD_HASHER_SECRET";

/// Secrets for the card-number protection pipeline.
#[derive(Debug, Clone)]
pub struct CryptoConfig {
    /// Password the symmetric encryption key is derived from.
    pub encryption_password: String,
    /// Salt mixed into the key derivation.
    pub encryption_salt: String,
    /// Secret key for the HMAC blind index. Independent of the other two.
    pub hasher_secret: String,
}

impl CryptoConfig {
    pub fn new(
        encryption_password: impl Into<String>,
        encryption_salt: impl Into<String>,
        hasher_secret: impl Into<String>,
    ) -> Self {
        Self {
            encryption_password: encryption_password.into(),
            encryption_salt: encryption_salt.into(),
            hasher_secret: hasher_secret.into(),
        }
    }

    /// Load all three secrets from the environment.
    ///
    /// A missing or empty variable fails closed with
    /// [`Error::CryptoUnavailable`]; the engine must not start without its
    /// key material.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            encryption_password: require(ENCRYPTION_PASSWORD_ENV)?,
            encryption_salt: require(ENCRYPTION_SALT_ENV)?,
            hasher_secret: require(HASHER_SECRET_ENV)?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::CryptoUnavailable(format!("{name} is not set"))),
    }
}
