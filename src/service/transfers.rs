// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Transfer validator and balance mutation.
//!
//! A transfer is a synchronous, same-currency, single-entry-pair operation:
//! validate, then move the amount between two already-fetched cards. The
//! two balance writes belong to the caller's transaction boundary; this
//! module never touches storage and never reorders the card arguments.
//!
//! All arithmetic is fixed-point [`Decimal`] with 2 fraction digits.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::model::{Card, CardStatus};

/// Ordered transfer preconditions; the first failure wins.
pub fn validate_for_transfer(from_card: &Card, to_card: &Card, amount: Decimal) -> Result<()> {
    if from_card.id == to_card.id {
        return Err(Error::transfer_not_allowed("Cannot transfer to the same card"));
    }

    if from_card.status != CardStatus::Active {
        return Err(Error::transfer_not_allowed(format!(
            "Cannot transfer from card with status: {}",
            from_card.status
        )));
    }

    if to_card.status != CardStatus::Active {
        return Err(Error::transfer_not_allowed(format!(
            "Cannot transfer to card with status: {}",
            to_card.status
        )));
    }

    if amount <= Decimal::ZERO {
        return Err(Error::transfer_not_allowed("Transfer amount must be positive"));
    }

    if from_card.balance < amount {
        return Err(Error::transfer_not_allowed(format!(
            "Insufficient balance for transfer. Available: {}, Required: {}",
            from_card.balance, amount
        )));
    }

    Ok(())
}

/// Validate and apply a transfer as one logical unit.
///
/// On success both balances are adjusted in memory; on failure neither card
/// is touched. The caller persists both cards together
/// (see [`crate::storage::CardStore::save_all`]).
pub fn transfer(from_card: &mut Card, to_card: &mut Card, amount: Decimal) -> Result<()> {
    validate_for_transfer(from_card, to_card, amount)?;
    from_card.balance -= amount;
    to_card.balance += amount;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardId, UserId};
    use chrono::Utc;

    fn test_card(status: CardStatus, balance: Decimal) -> Card {
        Card {
            id: CardId::generate(),
            card_number_ciphertext: "ciphertext".to_string(),
            card_number_hash: format!("hash-{}", uuid::Uuid::new_v4()),
            owner_id: UserId::generate(),
            expiry_date: Utc::now().date_naive() + chrono::Duration::days(365),
            status,
            balance,
        }
    }

    fn cards() -> (Card, Card) {
        (
            test_card(CardStatus::Active, Decimal::new(100000, 2)), // 1000.00
            test_card(CardStatus::Active, Decimal::new(50000, 2)),  // 500.00
        )
    }

    #[test]
    fn transfer_moves_amount_and_conserves_total() {
        let (mut from, mut to) = cards();
        let before_total = from.balance + to.balance;

        transfer(&mut from, &mut to, Decimal::new(10000, 2)).unwrap();

        assert_eq!(from.balance, Decimal::new(90000, 2));
        assert_eq!(to.balance, Decimal::new(60000, 2));
        assert_eq!(from.balance + to.balance, before_total);
    }

    #[test]
    fn transfer_of_exact_balance_drains_to_zero() {
        let (mut from, mut to) = cards();

        transfer(&mut from, &mut to, Decimal::new(100000, 2)).unwrap();

        assert_eq!(from.balance, Decimal::new(0, 2));
        assert_eq!(from.balance.to_string(), "0.00");
        assert_eq!(to.balance, Decimal::new(150000, 2));
    }

    #[test]
    fn rejects_transfer_to_the_same_card() {
        let (mut from, _) = cards();
        let mut same = from.clone();

        let result = transfer(&mut from, &mut same, Decimal::new(10000, 2));
        match result {
            Err(Error::TransferNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot transfer to the same card");
            }
            other => panic!("expected TransferNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blocked_source_card() {
        let (mut from, mut to) = cards();
        from.status = CardStatus::Blocked;

        let result = transfer(&mut from, &mut to, Decimal::new(10000, 2));
        match result {
            Err(Error::TransferNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot transfer from card with status: BLOCKED");
            }
            other => panic!("expected TransferNotAllowed, got {other:?}"),
        }
        assert_eq!(from.balance, Decimal::new(100000, 2));
        assert_eq!(to.balance, Decimal::new(50000, 2));
    }

    #[test]
    fn rejects_expired_destination_card() {
        let (mut from, mut to) = cards();
        to.status = CardStatus::Expired;

        let result = transfer(&mut from, &mut to, Decimal::new(10000, 2));
        match result {
            Err(Error::TransferNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot transfer to card with status: EXPIRED");
            }
            other => panic!("expected TransferNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        for amount in [Decimal::new(0, 2), Decimal::new(-10000, 2)] {
            let (mut from, mut to) = cards();
            let result = transfer(&mut from, &mut to, amount);
            match result {
                Err(Error::TransferNotAllowed(msg)) => {
                    assert_eq!(msg, "Transfer amount must be positive");
                }
                other => panic!("expected TransferNotAllowed, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_amount_exceeding_balance_with_figures() {
        let (mut from, mut to) = cards();

        let result = transfer(&mut from, &mut to, Decimal::new(200000, 2));
        match result {
            Err(Error::TransferNotAllowed(msg)) => {
                assert_eq!(
                    msg,
                    "Insufficient balance for transfer. Available: 1000.00, Required: 2000.00"
                );
            }
            other => panic!("expected TransferNotAllowed, got {other:?}"),
        }
        assert_eq!(from.balance, Decimal::new(100000, 2));
    }

    #[test]
    fn status_checks_precede_amount_checks() {
        // A blocked source reports the status problem even for a bad amount.
        let (mut from, mut to) = cards();
        from.status = CardStatus::Blocked;

        let result = transfer(&mut from, &mut to, Decimal::ZERO);
        match result {
            Err(Error::TransferNotAllowed(msg)) => {
                assert_eq!(msg, "Cannot transfer from card with status: BLOCKED");
            }
            other => panic!("expected TransferNotAllowed, got {other:?}"),
        }
    }
}
