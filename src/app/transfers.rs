// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Actor-facing transfer operation.
//!
//! Both cards are fetched through the combined id+owner lookup, so the actor
//! must own source and destination; a miss on either reads as `NotFound`
//! without revealing whether the card exists. The two balance writes are
//! persisted together through `save_all`.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Actor, TransferRequest};
use crate::service::{transfer, CardService};
use crate::storage::CardStore;

/// Transfers between the acting user's own cards.
pub struct TransferOperations {
    cards: CardService,
    store: Arc<dyn CardStore>,
}

impl TransferOperations {
    pub fn new(card_store: Arc<dyn CardStore>) -> Self {
        Self {
            cards: CardService::new(card_store.clone()),
            store: card_store,
        }
    }

    /// Move an amount between two cards owned by the actor.
    pub fn transfer(&self, actor: &Actor, request: TransferRequest) -> Result<()> {
        if request.amount.scale() > 2 {
            return Err(Error::data_not_valid(
                "Transfer amount must have at most 2 decimal places",
            ));
        }

        let mut from_card = self
            .cards
            .get_card_for_owner(request.from_card_id, actor.user_id)?;
        let mut to_card = self
            .cards
            .get_card_for_owner(request.to_card_id, actor.user_id)?;

        transfer(&mut from_card, &mut to_card, request.amount)?;

        // One unit of work: a crash between the two writes must not be
        // observable.
        self.store.save_all(&[from_card, to_card])?;

        tracing::info!(
            actor = %actor.username,
            from_card = %request.from_card_id,
            to_card = %request.to_card_id,
            amount = %request.amount,
            "transfer completed"
        );
        Ok(())
    }
}
