// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! Actor-facing user management. ADMIN only, except reading one's own
//! record.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Actor, NewUser, User, UserId};
use crate::service::UserService;
use crate::storage::{CardStore, Page, PageRequest, UserStore};

/// User management operations guarded by the acting identity.
pub struct UserOperations {
    users: UserService,
}

impl UserOperations {
    pub fn new(user_store: Arc<dyn UserStore>, card_store: Arc<dyn CardStore>) -> Self {
        Self {
            users: UserService::new(user_store, card_store),
        }
    }

    /// Register a user. ADMIN only.
    pub fn create(&self, actor: &Actor, new_user: NewUser) -> Result<User> {
        require_admin(actor)?;
        let user = self.users.create_user(new_user)?;
        tracing::info!(actor = %actor.username, user_id = %user.id, "user created");
        Ok(user)
    }

    /// Fetch a user. Self or ADMIN.
    pub fn get(&self, actor: &Actor, user_id: UserId) -> Result<User> {
        if actor.user_id != user_id && !actor.is_admin() {
            return Err(Error::access_denied(format!(
                "User '{}' does not have access to user with id {user_id}",
                actor.username
            )));
        }
        self.users.get_user_by_id(user_id)
    }

    /// Page through all users. ADMIN only.
    pub fn list(&self, actor: &Actor, page: PageRequest) -> Result<Page<User>> {
        require_admin(actor)?;
        self.users.get_users(page)
    }

    /// Rename a user. ADMIN only.
    pub fn rename(&self, actor: &Actor, user_id: UserId, new_username: &str) -> Result<User> {
        require_admin(actor)?;
        let user = self.users.get_user_by_id(user_id)?;
        self.users.update_username(user, new_username)
    }

    /// Delete a user that owns no cards. ADMIN only.
    pub fn delete(&self, actor: &Actor, user_id: UserId) -> Result<()> {
        require_admin(actor)?;
        self.users.delete_user_by_id(user_id)?;
        tracing::info!(actor = %actor.username, user_id = %user_id, "user deleted");
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardStatus, NewCard, Role};
    use crate::storage::{InMemoryCardStore, InMemoryUserStore};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn setup() -> (UserOperations, Arc<InMemoryCardStore>, Arc<InMemoryUserStore>) {
        let users = Arc::new(InMemoryUserStore::new());
        let cards = Arc::new(InMemoryCardStore::new());
        (
            UserOperations::new(users.clone(), cards.clone()),
            cards,
            users,
        )
    }

    fn stored_actor(users: &InMemoryUserStore, username: &str, role: Role) -> Actor {
        let user = users
            .insert(NewUser {
                username: username.to_string(),
                role,
            })
            .unwrap();
        Actor {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }

    #[test]
    fn create_and_list_are_admin_only() {
        let (ops, _, users) = setup();
        let admin = stored_actor(&users, "admin", Role::Admin);
        let alice = stored_actor(&users, "alice", Role::User);

        let denied = ops.create(
            &alice,
            NewUser {
                username: "bob".to_string(),
                role: Role::User,
            },
        );
        assert!(matches!(denied, Err(Error::AccessDenied(_))));

        let bob = ops
            .create(
                &admin,
                NewUser {
                    username: "bob".to_string(),
                    role: Role::User,
                },
            )
            .unwrap();
        assert_eq!(bob.username, "bob");

        assert!(matches!(
            ops.list(&alice, PageRequest::default()),
            Err(Error::AccessDenied(_))
        ));
        let page = ops.list(&admin, PageRequest::default()).unwrap();
        assert_eq!(page.total, 3);
    }

    #[test]
    fn get_allows_self_and_admin() {
        let (ops, _, users) = setup();
        let admin = stored_actor(&users, "admin", Role::Admin);
        let alice = stored_actor(&users, "alice", Role::User);
        let bob = stored_actor(&users, "bob", Role::User);

        assert!(ops.get(&alice, alice.user_id).is_ok());
        assert!(ops.get(&admin, alice.user_id).is_ok());

        let denied = ops.get(&bob, alice.user_id);
        assert!(matches!(denied, Err(Error::AccessDenied(_))));
    }

    #[test]
    fn rename_goes_through_the_validator() {
        let (ops, _, users) = setup();
        let admin = stored_actor(&users, "admin", Role::Admin);
        let alice = stored_actor(&users, "alice", Role::User);

        let renamed = ops.rename(&admin, alice.user_id, "alice-prime").unwrap();
        assert_eq!(renamed.username, "alice-prime");

        let same = ops.rename(&admin, alice.user_id, "alice-prime");
        assert!(matches!(same, Err(Error::OperationNotAllowed(_))));

        let taken = ops.rename(&admin, alice.user_id, "admin");
        assert!(matches!(taken, Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn delete_respects_linked_cards() {
        let (ops, cards, users) = setup();
        let admin = stored_actor(&users, "admin", Role::Admin);
        let alice = stored_actor(&users, "alice", Role::User);

        cards
            .insert(NewCard {
                card_number_ciphertext: "ciphertext".to_string(),
                card_number_hash: "hash".to_string(),
                owner_id: alice.user_id,
                expiry_date: Utc::now().date_naive() + chrono::Duration::days(365),
                status: CardStatus::Active,
                balance: Decimal::ZERO,
            })
            .unwrap();

        let blocked = ops.delete(&admin, alice.user_id);
        assert!(matches!(blocked, Err(Error::OperationNotAllowed(_))));

        cards.delete(cards.find_all(PageRequest::default()).unwrap().items[0].id).unwrap();
        ops.delete(&admin, alice.user_id).unwrap();
        assert!(matches!(
            ops.get(&admin, alice.user_id),
            Err(Error::NotFound(_))
        ));
    }
}
