// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! # Application Services
//!
//! Actor-facing orchestration over the domain services. Every operation
//! receives the acting identity ([`crate::model::Actor`]) from the
//! authentication boundary and decides who may act on which card:
//!
//! - Read / Block: the card's owner, or an ADMIN
//! - Create / Activate / Delete / Owner-lookup / user management: ADMIN only
//! - Transfer: the actor must own both cards, verified with a combined
//!   id+owner lookup so a non-owner cannot probe card existence
//!
//! Access violations are [`crate::Error::AccessDenied`], distinct from
//! `OperationNotAllowed` (policy failure on a card the actor may touch) and
//! from `NotFound` (no such resource - also returned, deliberately, when an
//! id+owner lookup misses on ownership).

pub mod cards;
pub mod transfers;
pub mod users;

pub use cards::CardOperations;
pub use transfers::TransferOperations;
pub use users::UserOperations;

use std::sync::Arc;

use crate::crypto::CryptoEngine;
use crate::storage::{CardStore, UserStore};

/// The wired engine: one value bundling every actor-facing service.
///
/// Construct once at startup with the process-wide [`CryptoEngine`] and the
/// chosen storage backend, then share freely; all components are `Send +
/// Sync` and internally immutable.
pub struct CardVault {
    pub cards: CardOperations,
    pub transfers: TransferOperations,
    pub users: UserOperations,
}

impl CardVault {
    pub fn new(
        crypto: Arc<CryptoEngine>,
        card_store: Arc<dyn CardStore>,
        user_store: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            cards: CardOperations::new(crypto.clone(), card_store.clone(), user_store.clone()),
            transfers: TransferOperations::new(card_store.clone()),
            users: UserOperations::new(user_store, card_store),
        }
    }
}
