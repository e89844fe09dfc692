// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Cardvault - Bank Card Vault Engine
//!
//! Encrypted-at-rest card number storage, a card lifecycle state machine,
//! and balance transfers with strict financial invariants. HTTP transport,
//! authentication, and database technology are external collaborators: this
//! crate receives an already-authenticated [`model::Actor`] and talks to
//! persistence through the [`storage`] traits.
//!
//! ## Modules
//!
//! - `app` - actor-facing operations (ownership and access control)
//! - `service` - domain services and validators
//! - `crypto` - card-number cipher, blind-index hasher, display masker
//! - `storage` - storage capability traits + in-memory reference backend
//! - `model` - entities and value types
//! - `config` - secret configuration consumed at startup
//! - `error` - the crate-wide error taxonomy
//!
//! ## Startup
//!
//! ```rust,ignore
//! let crypto = Arc::new(CryptoEngine::from_config(&CryptoConfig::from_env()?)?);
//! let vault = CardVault::new(crypto, card_store, user_store);
//! let view = vault.cards.get(&actor, card_id)?;
//! ```

pub mod app;
pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod service;
pub mod storage;

pub use app::CardVault;
pub use config::CryptoConfig;
pub use crypto::CryptoEngine;
pub use error::{Error, Result};
