// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! In-memory reference backends, one repository per entity.
//!
//! Each store keeps its entities in a map behind a single `RwLock`.
//! `save_all` takes the write lock once, so a transfer's two card writes are
//! observed together or not at all. Insertion order is retained for stable
//! pagination.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::{Card, CardId, NewCard, NewUser, User, UserId};

use super::{CardStore, Page, PageRequest, UserStore};

fn paginate<T: Clone>(ordered: &[T], request: PageRequest) -> Page<T> {
    let total = ordered.len();
    let items = ordered
        .iter()
        .skip(request.offset())
        .take(request.size)
        .cloned()
        .collect();
    Page {
        items,
        page: request.page,
        size: request.size,
        total,
    }
}

// =============================================================================
// Cards
// =============================================================================

#[derive(Default)]
struct CardsInner {
    cards: HashMap<CardId, Card>,
    order: Vec<CardId>,
}

/// Thread-safe in-memory card repository.
#[derive(Default)]
pub struct InMemoryCardStore {
    inner: RwLock<CardsInner>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CardStore for InMemoryCardStore {
    fn insert(&self, new_card: NewCard) -> Result<Card> {
        let mut inner = self.inner.write().expect("card store lock poisoned");

        if inner
            .cards
            .values()
            .any(|card| card.card_number_hash == new_card.card_number_hash)
        {
            return Err(Error::already_exists(
                "Card with the same number hash already exists",
            ));
        }

        let card = Card {
            id: CardId::generate(),
            card_number_ciphertext: new_card.card_number_ciphertext,
            card_number_hash: new_card.card_number_hash,
            owner_id: new_card.owner_id,
            expiry_date: new_card.expiry_date,
            status: new_card.status,
            balance: new_card.balance,
        };
        inner.order.push(card.id);
        inner.cards.insert(card.id, card.clone());
        Ok(card)
    }

    fn find_by_id(&self, card_id: CardId) -> Result<Option<Card>> {
        let inner = self.inner.read().expect("card store lock poisoned");
        Ok(inner.cards.get(&card_id).cloned())
    }

    fn find_by_id_and_owner(&self, card_id: CardId, owner_id: UserId) -> Result<Option<Card>> {
        let inner = self.inner.read().expect("card store lock poisoned");
        Ok(inner
            .cards
            .get(&card_id)
            .filter(|card| card.owner_id == owner_id)
            .cloned())
    }

    fn exists_by_card_number_hash(&self, card_number_hash: &str) -> Result<bool> {
        let inner = self.inner.read().expect("card store lock poisoned");
        Ok(inner
            .cards
            .values()
            .any(|card| card.card_number_hash == card_number_hash))
    }

    fn exists_by_owner(&self, owner_id: UserId) -> Result<bool> {
        let inner = self.inner.read().expect("card store lock poisoned");
        Ok(inner.cards.values().any(|card| card.owner_id == owner_id))
    }

    fn save(&self, card: &Card) -> Result<()> {
        let mut inner = self.inner.write().expect("card store lock poisoned");
        if !inner.cards.contains_key(&card.id) {
            return Err(Error::not_found(format!("Card with id {} not found", card.id)));
        }
        inner.cards.insert(card.id, card.clone());
        Ok(())
    }

    fn save_all(&self, cards: &[Card]) -> Result<()> {
        let mut inner = self.inner.write().expect("card store lock poisoned");
        for card in cards {
            if !inner.cards.contains_key(&card.id) {
                return Err(Error::not_found(format!("Card with id {} not found", card.id)));
            }
        }
        for card in cards {
            inner.cards.insert(card.id, card.clone());
        }
        Ok(())
    }

    fn delete(&self, card_id: CardId) -> Result<()> {
        let mut inner = self.inner.write().expect("card store lock poisoned");
        if inner.cards.remove(&card_id).is_none() {
            return Err(Error::not_found(format!("Card with id {card_id} not found")));
        }
        inner.order.retain(|id| *id != card_id);
        Ok(())
    }

    fn find_all(&self, page: PageRequest) -> Result<Page<Card>> {
        let inner = self.inner.read().expect("card store lock poisoned");
        let ordered: Vec<Card> = inner
            .order
            .iter()
            .filter_map(|id| inner.cards.get(id).cloned())
            .collect();
        Ok(paginate(&ordered, page))
    }

    fn find_all_by_owner(&self, owner_id: UserId, page: PageRequest) -> Result<Page<Card>> {
        let inner = self.inner.read().expect("card store lock poisoned");
        let ordered: Vec<Card> = inner
            .order
            .iter()
            .filter_map(|id| inner.cards.get(id).cloned())
            .filter(|card| card.owner_id == owner_id)
            .collect();
        Ok(paginate(&ordered, page))
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Default)]
struct UsersInner {
    users: HashMap<UserId, User>,
    order: Vec<UserId>,
}

/// Thread-safe in-memory user repository.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<UsersInner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, new_user: NewUser) -> Result<User> {
        let mut inner = self.inner.write().expect("user store lock poisoned");

        if inner
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Err(Error::already_exists(format!(
                "User '{}' already exists",
                new_user.username
            )));
        }

        let user = User {
            id: UserId::generate(),
            username: new_user.username,
            role: new_user.role,
        };
        inner.order.push(user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let inner = self.inner.read().expect("user store lock poisoned");
        Ok(inner.users.get(&user_id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let inner = self.inner.read().expect("user store lock poisoned");
        Ok(inner
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    fn exists_by_username(&self, username: &str) -> Result<bool> {
        let inner = self.inner.read().expect("user store lock poisoned");
        Ok(inner.users.values().any(|user| user.username == username))
    }

    fn save(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        if !inner.users.contains_key(&user.id) {
            return Err(Error::not_found(format!("User with id {} not found", user.id)));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    fn delete(&self, user_id: UserId) -> Result<()> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        if inner.users.remove(&user_id).is_none() {
            return Err(Error::not_found(format!("User with id {user_id} not found")));
        }
        inner.order.retain(|id| *id != user_id);
        Ok(())
    }

    fn find_all(&self, page: PageRequest) -> Result<Page<User>> {
        let inner = self.inner.read().expect("user store lock poisoned");
        let ordered: Vec<User> = inner
            .order
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect();
        Ok(paginate(&ordered, page))
    }
}
