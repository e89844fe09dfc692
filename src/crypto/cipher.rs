// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Reversible card-number encryption.
//!
//! Card numbers are encrypted with AES-256-GCM before they reach the storage
//! backend. The 32-byte key is derived once, at construction, from the
//! configured password and salt via Argon2id; it never changes for the
//! lifetime of the process. Each `encrypt` call uses a fresh random 96-bit
//! nonce, so equal plaintexts produce distinct ciphertexts.
//!
//! Ciphertext wire format: `base64(nonce || ciphertext+tag)` - a printable
//! string safe for a text column.
//!
//! Uniqueness lookups never go through this module; they use the blind index
//! in [`super::hasher`].

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits).
const NONCE_SIZE: usize = 12;

/// Symmetric cipher for card numbers, keyed once at startup.
///
/// Safe to share across threads behind an `Arc`; the key material is
/// immutable after construction.
pub struct CardCipher {
    cipher: Aes256Gcm,
}

impl CardCipher {
    /// Derive the AES-256 key from `password` and `salt` and build the cipher.
    ///
    /// The salt string is stretched to 32 bytes with SHA-256 before the
    /// Argon2id derivation, so arbitrary configured strings are accepted.
    /// Any derivation failure is [`Error::CryptoUnavailable`].
    pub fn new(password: &str, salt: &str) -> Result<Self> {
        let salt_bytes = Sha256::digest(salt.as_bytes());

        let mut key = [0u8; 32];
        argon2::Argon2::default()
            .hash_password_into(password.as_bytes(), salt_bytes.as_slice(), &mut key)
            .map_err(|e| Error::CryptoUnavailable(format!("key derivation failed: {e}")))?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| Error::CryptoUnavailable(format!("failed to create cipher: {e}")))?;

        // Wipe the stack copy; the cipher retains its own key schedule.
        key.iter_mut().for_each(|b| *b = 0);

        Ok(Self { cipher })
    }

    /// Encrypt a raw card number into a printable ciphertext string.
    pub fn encrypt(&self, raw_card_number: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, raw_card_number.as_bytes())
            .map_err(|e| Error::CryptoUnavailable(format!("encryption failed: {e}")))?;

        let mut framed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);

        Ok(Base64::encode_string(&framed))
    }

    /// Decrypt a stored ciphertext back to the raw card number.
    ///
    /// Every failure mode - bad base64, truncated frame, authentication
    /// failure, invalid UTF-8 - is [`Error::DataCorruption`]: stored data
    /// this function cannot decrypt is unrecoverable and must not be retried.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let framed = Base64::decode_vec(ciphertext)
            .map_err(|e| Error::DataCorruption(format!("invalid ciphertext encoding: {e}")))?;

        if framed.len() <= NONCE_SIZE {
            return Err(Error::DataCorruption(format!(
                "ciphertext too short: {} bytes",
                framed.len()
            )));
        }

        let (nonce_bytes, payload) = framed.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, payload)
            .map_err(|_| Error::DataCorruption("authentication failed on decrypt".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::DataCorruption(format!("decrypted data is not UTF-8: {e}")))
    }
}
