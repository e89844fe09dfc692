// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! # Storage Capability
//!
//! The engine's only persistence boundary. Backends implement [`CardStore`]
//! and [`UserStore`]; the crate ships [`memory::InMemoryCardStore`] and
//! [`memory::InMemoryUserStore`] as reference backends for embedders and
//! tests.
//!
//! ## Contract Notes
//!
//! - Identifiers are assigned by the store on `insert`.
//! - `find_by_id_and_owner` is a single combined predicate, not "find then
//!   compare owner in code": a caller must not be able to distinguish
//!   "absent" from "not yours".
//! - `save_all` persists several cards as one unit of work; a transfer's two
//!   balance writes go through it so a crash between them cannot leave
//!   balances inconsistent. Real database backends map it onto a
//!   transaction; concurrent writers to the same card must serialize there
//!   (row lock or version check).

pub mod memory;

pub use memory::{InMemoryCardStore, InMemoryUserStore};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Card, CardId, NewCard, NewUser, User, UserId};

// =============================================================================
// Pagination
// =============================================================================

/// Zero-based page request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

/// One page of results plus the total element count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Map the page's items, keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }

    /// Map the page's items with a fallible function, keeping the envelope.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> std::result::Result<U, E>) -> std::result::Result<Page<U>, E> {
        Ok(Page {
            items: self
                .items
                .into_iter()
                .map(f)
                .collect::<std::result::Result<Vec<_>, E>>()?,
            page: self.page,
            size: self.size,
            total: self.total,
        })
    }
}

// =============================================================================
// Card Store
// =============================================================================

/// Persistence capability for cards.
pub trait CardStore: Send + Sync {
    /// Persist a new card; the store assigns and returns its id.
    fn insert(&self, new_card: NewCard) -> Result<Card>;

    fn find_by_id(&self, card_id: CardId) -> Result<Option<Card>>;

    /// Single combined lookup on card id AND owner id.
    fn find_by_id_and_owner(&self, card_id: CardId, owner_id: UserId) -> Result<Option<Card>>;

    /// Uniqueness probe on the blind index. Never decrypts stored data.
    fn exists_by_card_number_hash(&self, card_number_hash: &str) -> Result<bool>;

    fn exists_by_owner(&self, owner_id: UserId) -> Result<bool>;

    /// Persist changes to an existing card.
    fn save(&self, card: &Card) -> Result<()>;

    /// Persist several cards as a single unit of work.
    fn save_all(&self, cards: &[Card]) -> Result<()>;

    fn delete(&self, card_id: CardId) -> Result<()>;

    fn find_all(&self, page: PageRequest) -> Result<Page<Card>>;

    fn find_all_by_owner(&self, owner_id: UserId, page: PageRequest) -> Result<Page<Card>>;
}

// =============================================================================
// User Store
// =============================================================================

/// Persistence capability for users.
pub trait UserStore: Send + Sync {
    /// Persist a new user; the store assigns and returns its id.
    fn insert(&self, new_user: NewUser) -> Result<User>;

    fn find_by_id(&self, user_id: UserId) -> Result<Option<User>>;

    fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    fn exists_by_username(&self, username: &str) -> Result<bool>;

    /// Persist changes to an existing user.
    fn save(&self, user: &User) -> Result<()>;

    fn delete(&self, user_id: UserId) -> Result<()>;

    fn find_all(&self, page: PageRequest) -> Result<Page<User>>;
}
