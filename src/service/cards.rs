// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Card lifecycle service and validator.
//!
//! The validator checks each operation's preconditions against the entity
//! and the store's existence probes, failing fast with a specific business
//! error and performing no partial mutation. The service applies the
//! transitions and persists them.
//!
//! Reads by id (and by id+owner) apply the lazy expiry transition: a card
//! whose expiry date has passed is marked `EXPIRED` and persisted before it
//! is returned, exactly once.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::crypto::mask;
use crate::error::{Error, Result};
use crate::model::{Card, CardId, CardStatus, NewCard, Role, User, UserId};
use crate::storage::{CardStore, Page, PageRequest};

/// Precondition checks for card operations.
pub struct CardValidator {
    cards: Arc<dyn CardStore>,
}

impl CardValidator {
    pub fn new(cards: Arc<dyn CardStore>) -> Self {
        Self { cards }
    }

    /// Creation preconditions: non-admin owner, future expiry, unused number.
    ///
    /// Uniqueness is probed through the blind index only; stored ciphertexts
    /// are never decrypted for this check.
    pub fn validate_for_create(
        &self,
        owner: &User,
        raw_card_number: &str,
        card_number_hash: &str,
        expiry_date: NaiveDate,
    ) -> Result<()> {
        if owner.role == Role::Admin {
            return Err(Error::operation_not_allowed(
                "Cannot create a card for ADMIN user",
            ));
        }

        if expiry_date <= Utc::now().date_naive() {
            return Err(Error::data_not_valid("Expiration date must be in the future"));
        }

        if self.cards.exists_by_card_number_hash(card_number_hash)? {
            return Err(Error::already_exists(format!(
                "Card with number {} already exists",
                mask(raw_card_number)
            )));
        }

        Ok(())
    }

    /// Only an `ACTIVE` card can be blocked.
    pub fn validate_for_block(&self, card: &Card) -> Result<()> {
        if card.status != CardStatus::Active {
            return Err(Error::operation_not_allowed(format!(
                "Cannot block card with status: {}",
                card.status
            )));
        }
        Ok(())
    }

    /// Only a `BLOCKED` card can be activated.
    pub fn validate_for_activate(&self, card: &Card) -> Result<()> {
        if card.status != CardStatus::Blocked {
            return Err(Error::operation_not_allowed(format!(
                "Cannot activate card with status: {}",
                card.status
            )));
        }
        Ok(())
    }

    /// Deletion requires a non-active card with a zero balance.
    pub fn validate_for_delete(&self, card: &Card) -> Result<()> {
        if card.status == CardStatus::Active {
            return Err(Error::operation_not_allowed(format!(
                "Cannot delete card with status: {}. Card must be blocked first",
                card.status
            )));
        }

        if card.balance != Decimal::ZERO {
            return Err(Error::operation_not_allowed(format!(
                "Cannot delete card with non-zero balance: {}",
                card.balance
            )));
        }

        Ok(())
    }
}

/// Card lifecycle operations against the storage capability.
pub struct CardService {
    cards: Arc<dyn CardStore>,
    validator: CardValidator,
}

impl CardService {
    pub fn new(cards: Arc<dyn CardStore>) -> Self {
        let validator = CardValidator::new(cards.clone());
        Self { cards, validator }
    }

    /// Validate and persist a new card. The store assigns the id.
    ///
    /// `raw_card_number` is used only for the masked duplicate message; the
    /// stored entity carries the ciphertext and blind index computed by the
    /// caller.
    #[allow(clippy::too_many_arguments)]
    pub fn create_card(
        &self,
        owner: &User,
        raw_card_number: &str,
        card_number_ciphertext: String,
        card_number_hash: String,
        expiry_date: NaiveDate,
        initial_balance: Decimal,
    ) -> Result<Card> {
        self.validator
            .validate_for_create(owner, raw_card_number, &card_number_hash, expiry_date)?;

        self.cards.insert(NewCard {
            card_number_ciphertext,
            card_number_hash,
            owner_id: owner.id,
            expiry_date,
            status: CardStatus::Active,
            balance: initial_balance,
        })
    }

    /// Fetch a card by id, applying the lazy expiry transition.
    pub fn get_card(&self, card_id: CardId) -> Result<Card> {
        let card = self
            .cards
            .find_by_id(card_id)?
            .ok_or_else(|| Error::not_found(format!("Card with id {card_id} not found")))?;

        self.apply_expiry(card)
    }

    /// Fetch a card by id and owner in one combined predicate, applying the
    /// lazy expiry transition.
    ///
    /// A miss deliberately reads the same as an absent card, so a non-owner
    /// cannot probe for card existence.
    pub fn get_card_for_owner(&self, card_id: CardId, owner_id: UserId) -> Result<Card> {
        let card = self
            .cards
            .find_by_id_and_owner(card_id, owner_id)?
            .ok_or_else(|| Error::not_found("Card not found or does not belong to the user"))?;

        self.apply_expiry(card)
    }

    pub fn get_cards(&self, page: PageRequest) -> Result<Page<Card>> {
        self.cards.find_all(page)
    }

    pub fn get_cards_by_owner(&self, owner_id: UserId, page: PageRequest) -> Result<Page<Card>> {
        self.cards.find_all_by_owner(owner_id, page)
    }

    /// Block an `ACTIVE` card and persist the transition.
    pub fn block_card(&self, mut card: Card) -> Result<Card> {
        self.validator.validate_for_block(&card)?;
        card.status = CardStatus::Blocked;
        self.cards.save(&card)?;
        Ok(card)
    }

    /// Activate a `BLOCKED` card and persist the transition.
    pub fn activate_card(&self, mut card: Card) -> Result<Card> {
        self.validator.validate_for_activate(&card)?;
        card.status = CardStatus::Active;
        self.cards.save(&card)?;
        Ok(card)
    }

    /// Delete a non-active, zero-balance card.
    pub fn delete_card(&self, card: &Card) -> Result<()> {
        self.validator.validate_for_delete(card)?;
        self.cards.delete(card.id)
    }

    fn apply_expiry(&self, mut card: Card) -> Result<Card> {
        if card.expire_if_due(Utc::now().date_naive()) {
            self.cards.save(&card)?;
            tracing::info!(card_id = %card.id, "card marked as EXPIRED");
        }
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryCardStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn future_date() -> NaiveDate {
        today() + chrono::Duration::days(365)
    }

    fn store() -> Arc<InMemoryCardStore> {
        Arc::new(InMemoryCardStore::new())
    }

    fn test_owner(role: Role) -> User {
        User {
            id: UserId::generate(),
            username: format!("owner-{}", uuid::Uuid::new_v4()),
            role,
        }
    }

    fn create_test_card(service: &CardService, owner: &User) -> Card {
        service
            .create_card(
                owner,
                "1111 2222 3333 4444",
                "ciphertext".to_string(),
                format!("hash-{}", uuid::Uuid::new_v4()),
                future_date(),
                Decimal::new(100000, 2),
            )
            .unwrap()
    }

    #[test]
    fn created_card_starts_active() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        let card = create_test_card(&service, &owner);
        assert_eq!(card.status, CardStatus::Active);
        assert_eq!(card.owner_id, owner.id);
        assert_eq!(card.balance, Decimal::new(100000, 2));
    }

    #[test]
    fn create_rejects_admin_owner() {
        let store = store();
        let service = CardService::new(store.clone());
        let admin = test_owner(Role::Admin);

        let result = service.create_card(
            &admin,
            "1111 2222 3333 4444",
            "ciphertext".to_string(),
            "hash".to_string(),
            future_date(),
            Decimal::ZERO,
        );
        match result {
            Err(Error::OperationNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot create a card for ADMIN user");
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn create_rejects_expiry_not_strictly_future() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        for expiry in [today(), today() - chrono::Duration::days(10)] {
            let result = service.create_card(
                &owner,
                "1111 2222 3333 4444",
                "ciphertext".to_string(),
                "hash".to_string(),
                expiry,
                Decimal::ZERO,
            );
            match result {
                Err(Error::DataNotValid(msg)) => {
                    assert_eq!(msg, "Expiration date must be in the future");
                }
                other => panic!("expected DataNotValid, got {other:?}"),
            }
        }
    }

    #[test]
    fn create_rejects_duplicate_blind_index_with_masked_message() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        service
            .create_card(
                &owner,
                "1111 2222 3333 4444",
                "ciphertext-a".to_string(),
                "same-hash".to_string(),
                future_date(),
                Decimal::ZERO,
            )
            .unwrap();

        let result = service.create_card(
            &owner,
            "1111 2222 3333 4444",
            "ciphertext-b".to_string(),
            "same-hash".to_string(),
            future_date(),
            Decimal::ZERO,
        );
        match result {
            Err(Error::AlreadyExists(msg)) => {
                assert_eq!(msg, "Card with number **** **** **** 4444 already exists");
            }
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
    }

    #[test]
    fn block_and_activate_walk_the_state_machine() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);
        let card = create_test_card(&service, &owner);

        let blocked = service.block_card(card).unwrap();
        assert_eq!(blocked.status, CardStatus::Blocked);
        assert_eq!(
            service.get_card(blocked.id).unwrap().status,
            CardStatus::Blocked
        );

        let active = service.activate_card(blocked).unwrap();
        assert_eq!(active.status, CardStatus::Active);
        assert_eq!(
            service.get_card(active.id).unwrap().status,
            CardStatus::Active
        );
    }

    #[test]
    fn block_rejects_non_active_card() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        let blocked = service.block_card(create_test_card(&service, &owner)).unwrap();
        let result = service.block_card(blocked);
        match result {
            Err(Error::OperationNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot block card with status: BLOCKED");
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn activate_rejects_active_card() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        let card = create_test_card(&service, &owner);
        let result = service.activate_card(card);
        match result {
            Err(Error::OperationNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot activate card with status: ACTIVE");
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn block_and_activate_reject_expired_card() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        let mut card = create_test_card(&service, &owner);
        card.status = CardStatus::Expired;
        store.save(&card).unwrap();

        let block = service.block_card(card.clone());
        match block {
            Err(Error::OperationNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot block card with status: EXPIRED");
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }

        let activate = service.activate_card(card);
        match activate {
            Err(Error::OperationNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot activate card with status: EXPIRED");
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn delete_requires_blocked_or_expired_and_zero_balance() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        // Active card: rejected on status.
        let active = create_test_card(&service, &owner);
        match service.delete_card(&active) {
            Err(Error::OperationNotAllowed(msg)) => {
                assert_eq!(
                    msg,
                    "Cannot delete card with status: ACTIVE. Card must be blocked first"
                );
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }

        // Blocked with non-zero balance: rejected on balance.
        let blocked = service.block_card(active).unwrap();
        match service.delete_card(&blocked) {
            Err(Error::OperationNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot delete card with non-zero balance: 1000.00");
            }
            other => panic!("expected OperationNotAllowed, got {other:?}"),
        }

        // Blocked with zero balance: deleted.
        let mut drained = blocked;
        drained.balance = Decimal::ZERO;
        store.save(&drained).unwrap();
        service.delete_card(&drained).unwrap();
        assert!(store.find_by_id(drained.id).unwrap().is_none());
    }

    #[test]
    fn missing_card_reads_as_not_found() {
        let store = store();
        let service = CardService::new(store);

        let id = CardId::generate();
        match service.get_card(id) {
            Err(Error::NotFound(msg)) => {
                assert_eq!(msg, format!("Card with id {id} not found"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn owner_scoped_read_hides_foreign_cards() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);
        let stranger = test_owner(Role::User);

        let card = create_test_card(&service, &owner);

        assert!(service.get_card_for_owner(card.id, owner.id).is_ok());
        match service.get_card_for_owner(card.id, stranger.id) {
            Err(Error::NotFound(msg)) => {
                assert_eq!(msg, "Card not found or does not belong to the user");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    /// Store wrapper counting `save` calls, for asserting the lazy expiry
    /// write happens exactly once.
    struct SaveCountingStore {
        inner: Arc<InMemoryCardStore>,
        saves: AtomicUsize,
    }

    impl CardStore for SaveCountingStore {
        fn insert(&self, new_card: NewCard) -> Result<Card> {
            self.inner.insert(new_card)
        }
        fn find_by_id(&self, card_id: CardId) -> Result<Option<Card>> {
            self.inner.find_by_id(card_id)
        }
        fn find_by_id_and_owner(&self, card_id: CardId, owner_id: UserId) -> Result<Option<Card>> {
            self.inner.find_by_id_and_owner(card_id, owner_id)
        }
        fn exists_by_card_number_hash(&self, hash: &str) -> Result<bool> {
            self.inner.exists_by_card_number_hash(hash)
        }
        fn exists_by_owner(&self, owner_id: UserId) -> Result<bool> {
            self.inner.exists_by_owner(owner_id)
        }
        fn save(&self, card: &Card) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(card)
        }
        fn save_all(&self, cards: &[Card]) -> Result<()> {
            self.inner.save_all(cards)
        }
        fn delete(&self, card_id: CardId) -> Result<()> {
            self.inner.delete(card_id)
        }
        fn find_all(&self, page: PageRequest) -> Result<Page<Card>> {
            self.inner.find_all(page)
        }
        fn find_all_by_owner(&self, owner_id: UserId, page: PageRequest) -> Result<Page<Card>> {
            self.inner.find_all_by_owner(owner_id, page)
        }
    }

    #[test]
    fn lazy_expiry_persists_exactly_once() {
        let inner = store();
        let counting = Arc::new(SaveCountingStore {
            inner: inner.clone(),
            saves: AtomicUsize::new(0),
        });
        let service = CardService::new(counting.clone());
        let owner = test_owner(Role::User);

        // Insert directly with a past expiry, bypassing creation validation.
        let card = inner
            .insert(NewCard {
                card_number_ciphertext: "ciphertext".to_string(),
                card_number_hash: "hash".to_string(),
                owner_id: owner.id,
                expiry_date: today() - chrono::Duration::days(1),
                status: CardStatus::Active,
                balance: Decimal::ZERO,
            })
            .unwrap();

        let fetched = service.get_card(card.id).unwrap();
        assert_eq!(fetched.status, CardStatus::Expired);
        assert_eq!(counting.saves.load(Ordering::SeqCst), 1);

        // Second read sees EXPIRED without another write.
        let again = service.get_card(card.id).unwrap();
        assert_eq!(again.status, CardStatus::Expired);
        assert_eq!(counting.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lazy_expiry_applies_on_owner_scoped_read() {
        let store = store();
        let service = CardService::new(store.clone());
        let owner = test_owner(Role::User);

        let card = store
            .insert(NewCard {
                card_number_ciphertext: "ciphertext".to_string(),
                card_number_hash: "hash".to_string(),
                owner_id: owner.id,
                expiry_date: today() - chrono::Duration::days(1),
                status: CardStatus::Blocked,
                balance: Decimal::ZERO,
            })
            .unwrap();

        let fetched = service.get_card_for_owner(card.id, owner.id).unwrap();
        assert_eq!(fetched.status, CardStatus::Expired);
        assert_eq!(
            store.find_by_id(card.id).unwrap().unwrap().status,
            CardStatus::Expired
        );
    }
}
