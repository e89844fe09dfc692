// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Actor-facing card operations.
//!
//! The only place a raw card number exists in memory: creation hashes and
//! encrypts it, reads decrypt and immediately mask. Callers never see the
//! ciphertext or the raw number.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::crypto::{mask, CryptoEngine};
use crate::error::{Error, Result};
use crate::model::{Actor, Card, CardId, CardView, CreateCardRequest, User};
use crate::service::{CardService, UserService};
use crate::storage::{CardStore, Page, PageRequest, UserStore};

/// Card management operations guarded by the acting identity.
pub struct CardOperations {
    crypto: Arc<CryptoEngine>,
    cards: CardService,
    users: UserService,
}

impl CardOperations {
    pub fn new(
        crypto: Arc<CryptoEngine>,
        card_store: Arc<dyn CardStore>,
        user_store: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            crypto,
            cards: CardService::new(card_store.clone()),
            users: UserService::new(user_store, card_store),
        }
    }

    /// Create a card for a user. ADMIN only.
    ///
    /// The raw number is format-checked, hashed for the blind index, and
    /// encrypted for storage; it is not retained afterwards.
    pub fn create(&self, actor: &Actor, request: CreateCardRequest) -> Result<CardView> {
        require_admin(actor)?;

        if !well_formed_card_number(&request.card_number) {
            return Err(Error::data_not_valid("Invalid card number format"));
        }
        if request.initial_balance < Decimal::ZERO {
            return Err(Error::data_not_valid("Initial balance cannot be negative"));
        }

        let owner = self.users.get_user_by_id(request.owner_id)?;
        let card_number_hash = self.crypto.hasher.hash(&request.card_number)?;
        let card_number_ciphertext = self.crypto.cipher.encrypt(&request.card_number)?;

        let card = self.cards.create_card(
            &owner,
            &request.card_number,
            card_number_ciphertext,
            card_number_hash,
            request.expiry_date,
            request.initial_balance,
        )?;

        tracing::info!(
            actor = %actor.username,
            card_id = %card.id,
            owner_id = %owner.id,
            "card created"
        );
        self.view(&card)
    }

    /// Fetch a card for display. Owner or ADMIN.
    pub fn get(&self, actor: &Actor, card_id: CardId) -> Result<CardView> {
        let card = self.cards.get_card(card_id)?;

        if card.owner_id == actor.user_id {
            return self.view(&card);
        }

        if actor.is_admin() {
            tracing::info!(actor = %actor.username, card_id = %card_id, "admin accessed card");
            return self.view(&card);
        }

        tracing::warn!(actor = %actor.username, card_id = %card_id, "card access denied");
        Err(Error::access_denied(format!(
            "User '{}' does not have access to card with id {card_id}",
            actor.username
        )))
    }

    /// Look up the owning user of a card. ADMIN only.
    pub fn owner_of(&self, actor: &Actor, card_id: CardId) -> Result<User> {
        require_admin(actor)?;
        let card = self.cards.get_card(card_id)?;
        self.users.get_user_by_id(card.owner_id)
    }

    /// Page through cards: every card for an ADMIN, own cards otherwise.
    pub fn list(&self, actor: &Actor, page: PageRequest) -> Result<Page<CardView>> {
        let cards = if actor.is_admin() {
            self.cards.get_cards(page)?
        } else {
            self.cards.get_cards_by_owner(actor.user_id, page)?
        };

        tracing::info!(
            actor = %actor.username,
            count = cards.items.len(),
            page = page.page,
            size = page.size,
            "cards listed"
        );
        cards.try_map(|card| self.view(&card))
    }

    /// Block an active card. Owner or ADMIN.
    pub fn block(&self, actor: &Actor, card_id: CardId) -> Result<CardView> {
        let card = self.cards.get_card(card_id)?;

        if card.owner_id != actor.user_id && !actor.is_admin() {
            tracing::warn!(actor = %actor.username, card_id = %card_id, "block denied");
            return Err(Error::access_denied("Access denied to block this card"));
        }

        let blocked = self.cards.block_card(card)?;
        self.view(&blocked)
    }

    /// Reactivate a blocked card. ADMIN only.
    pub fn activate(&self, actor: &Actor, card_id: CardId) -> Result<CardView> {
        require_admin(actor)?;
        let card = self.cards.get_card(card_id)?;
        let activated = self.cards.activate_card(card)?;
        self.view(&activated)
    }

    /// Delete a blocked or expired card with zero balance. ADMIN only.
    pub fn delete(&self, actor: &Actor, card_id: CardId) -> Result<()> {
        require_admin(actor)?;
        let card = self.cards.get_card(card_id)?;
        self.cards.delete_card(&card)?;
        tracing::info!(actor = %actor.username, card_id = %card_id, "card deleted");
        Ok(())
    }

    fn view(&self, card: &Card) -> Result<CardView> {
        let raw = self.crypto.cipher.decrypt(&card.card_number_ciphertext)?;
        Ok(CardView::new(card, mask(&raw)))
    }
}

fn require_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Error::access_denied(format!(
            "User '{}' requires ADMIN role for this operation",
            actor.username
        )))
    }
}

/// Four space-separated groups of four digits.
fn well_formed_card_number(raw: &str) -> bool {
    let mut groups = 0;
    for group in raw.split(' ') {
        if group.len() != 4 || !group.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        groups += 1;
    }
    groups == 4
}
