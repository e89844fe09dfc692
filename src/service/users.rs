// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Cardvault Project

//! User lifecycle service and validator.
//!
//! Users are managed by collaborator services; this crate owns only the
//! invariants the card engine depends on: username uniqueness and the rule
//! that a user cannot be deleted while they still own cards.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{NewUser, User, UserId};
use crate::storage::{CardStore, Page, PageRequest, UserStore};

/// Precondition checks for user operations.
pub struct UserValidator {
    users: Arc<dyn UserStore>,
    cards: Arc<dyn CardStore>,
}

impl UserValidator {
    pub fn new(users: Arc<dyn UserStore>, cards: Arc<dyn CardStore>) -> Self {
        Self { users, cards }
    }

    pub fn validate_for_create(&self, new_user: &NewUser) -> Result<()> {
        self.validate_username_not_exists(&new_user.username)
    }

    pub fn validate_for_update_username(&self, user: &User, new_username: &str) -> Result<()> {
        if user.username == new_username {
            return Err(Error::operation_not_allowed(
                "New username cannot be the same as the current username",
            ));
        }
        self.validate_username_not_exists(new_username)
    }

    /// Deletion is blocked while the user owns any card.
    pub fn validate_for_delete(&self, user: &User) -> Result<()> {
        if self.cards.exists_by_owner(user.id)? {
            return Err(Error::operation_not_allowed(
                "User cannot be deleted because they have linked cards",
            ));
        }
        Ok(())
    }

    fn validate_username_not_exists(&self, username: &str) -> Result<()> {
        if self.users.exists_by_username(username)? {
            return Err(Error::already_exists(format!(
                "User '{username}' already exists"
            )));
        }
        Ok(())
    }
}

/// User lifecycle operations against the storage capability.
pub struct UserService {
    users: Arc<dyn UserStore>,
    validator: UserValidator,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, cards: Arc<dyn CardStore>) -> Self {
        let validator = UserValidator::new(users.clone(), cards);
        Self { users, validator }
    }

    /// Validate and persist a new user. The store assigns the id.
    pub fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.validator.validate_for_create(&new_user)?;
        self.users.insert(new_user)
    }

    pub fn get_user_by_id(&self, user_id: UserId) -> Result<User> {
        self.users
            .find_by_id(user_id)?
            .ok_or_else(|| Error::not_found(format!("User with id {user_id} not found")))
    }

    pub fn get_by_username(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)?
            .ok_or_else(|| Error::not_found(format!("User with username \"{username}\" not found")))
    }

    pub fn get_users(&self, page: PageRequest) -> Result<Page<User>> {
        self.users.find_all(page)
    }

    /// Rename a user and persist the change.
    pub fn update_username(&self, mut user: User, new_username: &str) -> Result<User> {
        self.validator.validate_for_update_username(&user, new_username)?;
        user.username = new_username.to_string();
        self.users.save(&user)?;
        Ok(user)
    }

    /// Delete a user that owns no cards.
    pub fn delete_user_by_id(&self, user_id: UserId) -> Result<()> {
        let user = self.get_user_by_id(user_id)?;
        self.validator.validate_for_delete(&user)?;
        self.users.delete(user.id)
    }
}
