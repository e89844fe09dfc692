// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Blind index for card-number uniqueness lookups.
//!
//! A deterministic keyed digest (HMAC-SHA256) of the raw card number lets the
//! storage layer enforce uniqueness without ever decrypting stored
//! ciphertexts. The HMAC secret is independent of the encryption secrets:
//! compromise of one must not compromise the other's guarantee.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Keyed hasher producing the card-number blind index.
///
/// Deterministic: equal card numbers always hash identically, so the digest
/// serves as a unique lookup key. Never depends on encryption randomness.
pub struct CardHasher {
    secret: Vec<u8>,
}

impl CardHasher {
    /// Build the hasher from the configured secret.
    ///
    /// An empty secret fails closed with [`Error::CryptoUnavailable`]; an
    /// unkeyed digest would silently degrade the index to a plain hash.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::CryptoUnavailable(
                "blind-index secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
        })
    }

    /// Compute the base64 HMAC-SHA256 digest of a raw card number.
    pub fn hash(&self, raw_card_number: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::CryptoUnavailable(format!("failed to initialize HMAC: {e}")))?;
        mac.update(raw_card_number.as_bytes());
        Ok(Base64::encode_string(&mac.finalize().into_bytes()))
    }
}
