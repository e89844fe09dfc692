// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! # Domain Model
//!
//! Entities and value types for the card vault. All types derive `Serialize`
//! and `Deserialize` for storage backends and callers that speak JSON.
//!
//! ## Identifier Types
//!
//! [`CardId`] and [`UserId`] are UUID newtypes. Identifiers are assigned by
//! the storage layer on insert and are immutable afterwards.
//!
//! ## Model Categories
//!
//! - **Cards**: the protected entity - encrypted number, blind index,
//!   balance, expiry, lifecycle status
//! - **Users**: referenced owners (id, username, role); authentication and
//!   password material live outside this crate
//! - **Requests/Views**: creation and transfer inputs, masked display output

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Identifier Types
// =============================================================================

/// Unique card identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub Uuid);

impl CardId {
    /// Generate a fresh identifier. Reserved for storage implementations.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique user identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a fresh identifier. Reserved for storage implementations.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Roles
// =============================================================================

/// User roles for authorization.
///
/// `Admin` manages cards and users; `User` owns cards and transfers between
/// them. Administrative accounts cannot own cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Normal account holder (owns cards).
    User,
    /// Full administrative access; cannot own cards.
    Admin,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            _ => false,
        }
    }

    /// Parse a role from its wire name (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Least privilege for authenticated accounts.
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

// =============================================================================
// Card Lifecycle
// =============================================================================

/// Card lifecycle status.
///
/// Transitions: creation starts at `Active`; `Active` -> `Blocked` (block),
/// `Blocked` -> `Active` (activate), and `Active`/`Blocked` -> `Expired`
/// lazily on read once the expiry date has passed. `Expired` is terminal for
/// block/activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardStatus {
    Active,
    Blocked,
    Expired,
}

impl Default for CardStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardStatus::Active => write!(f, "ACTIVE"),
            CardStatus::Blocked => write!(f, "BLOCKED"),
            CardStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

// =============================================================================
// Cards
// =============================================================================

/// A stored bank card.
///
/// The raw card number never appears here: `card_number_ciphertext` decrypts
/// to it, `card_number_hash` is its blind index. `balance` is only mutated by
/// the transfer engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    /// Identifier assigned by the storage layer; immutable.
    pub id: CardId,
    /// Encrypted card number (printable base64 frame).
    pub card_number_ciphertext: String,
    /// Deterministic keyed digest of the raw number; unique system-wide.
    /// Computed once at creation, never recomputed.
    pub card_number_hash: String,
    /// Owning user; set once at creation, never reassigned.
    pub owner_id: UserId,
    /// Calendar expiry date; strictly in the future at creation.
    pub expiry_date: NaiveDate,
    /// Current lifecycle status.
    pub status: CardStatus,
    /// Non-negative balance, fixed-point with 2 fraction digits.
    pub balance: Decimal,
}

impl Card {
    /// Apply the lazy expiry transition.
    ///
    /// Returns `true` when the status changed to [`CardStatus::Expired`], in
    /// which case the caller must persist the card within its transaction.
    /// Idempotent: an already-expired card is never transitioned again.
    pub fn expire_if_due(&mut self, today: NaiveDate) -> bool {
        if self.expiry_date < today && self.status != CardStatus::Expired {
            self.status = CardStatus::Expired;
            return true;
        }
        false
    }
}

/// A card about to be inserted, before the storage layer assigns its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub card_number_ciphertext: String,
    pub card_number_hash: String,
    pub owner_id: UserId,
    pub expiry_date: NaiveDate,
    pub status: CardStatus,
    pub balance: Decimal,
}

// =============================================================================
// Users
// =============================================================================

/// A referenced card owner.
///
/// Authentication, passwords, and sessions are external; this crate only
/// needs identity, username, and role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// A user about to be inserted, before the storage layer assigns its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub role: Role,
}

// =============================================================================
// Acting Identity
// =============================================================================

/// The authenticated identity performing an operation.
///
/// Arrives from the authentication boundary; the engine never re-derives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Requests and Views
// =============================================================================

/// Input for card creation. The only place a raw card number enters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCardRequest {
    /// Raw card number, space-separated 4-digit groups.
    pub card_number: String,
    /// The owning user; must not have role ADMIN.
    pub owner_id: UserId,
    /// Must be strictly in the future.
    pub expiry_date: NaiveDate,
    /// Opening balance; must not be negative.
    pub initial_balance: Decimal,
}

/// Input for a transfer between two cards of the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_card_id: CardId,
    pub to_card_id: CardId,
    /// Strictly positive, 2 fraction digits.
    pub amount: Decimal,
}

/// Card representation returned to callers (never the raw or encrypted
/// number).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardView {
    pub id: CardId,
    /// Masked display form, `**** **** **** NNNN`.
    pub masked_card_number: String,
    pub owner_id: UserId,
    pub expiry_date: NaiveDate,
    pub status: CardStatus,
    pub balance: Decimal,
}

impl CardView {
    pub fn new(card: &Card, masked_card_number: String) -> Self {
        Self {
            id: card.id,
            masked_card_number,
            owner_id: card.owner_id,
            expiry_date: card.expiry_date,
            status: card.status,
            balance: card.balance,
        }
    }
}
