// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! # Card-Number Protection Pipeline
//!
//! A raw card number enters the system exactly once, at card creation. From
//! there it is
//!
//! - hashed by [`CardHasher`] into a deterministic blind index used for
//!   uniqueness lookups,
//! - encrypted by [`CardCipher`] for storage,
//! - and, whenever shown to a user, formatted by [`mask`].
//!
//! [`CryptoEngine`] bundles the two keyed primitives. It is built once at
//! process start from [`CryptoConfig`] and shared read-only afterwards; key
//! material has no lifecycle beyond process start/stop.

pub mod cipher;
pub mod hasher;
pub mod masker;

pub use cipher::CardCipher;
pub use hasher::CardHasher;
pub use masker::mask;

use crate::config::CryptoConfig;
use crate::error::Result;

/// Process-wide crypto key material: cipher + blind-index hasher.
///
/// Immutable after construction; share behind an `Arc`.
pub struct CryptoEngine {
    pub cipher: CardCipher,
    pub hasher: CardHasher,
}

impl CryptoEngine {
    /// Initialize both primitives from the configured secrets.
    ///
    /// Fails closed with [`crate::Error::CryptoUnavailable`] if any secret
    /// is unusable.
    pub fn from_config(config: &CryptoConfig) -> Result<Self> {
        Ok(Self {
            cipher: CardCipher::new(&config.encryption_password, &config.encryption_salt)?,
            hasher: CardHasher::new(&config.hasher_secret)?,
        })
    }
}
