//! User domain service.
//!
//! Implements the user driving ports by passing validated input straight to
//! the repository and translating absence and persistence failures into
//! domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository, UsersCommand, UsersQuery};
use crate::domain::{Error, NewUser, User, UserChanges, UserId};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Service implementing [`UsersQuery`] and [`UsersCommand`] over a
/// [`UserRepository`].
#[derive(Clone)]
pub struct UserService<R> {
    user_repo: Arc<R>,
}

impl<R> UserService<R> {
    /// Create a new service with the user repository.
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.user_repo.list().await.map_err(map_repository_error)
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.user_repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let created = self
            .user_repo
            .insert(&user)
            .await
            .map_err(map_repository_error)?;
        debug!(user_id = %created.id(), "user created");
        Ok(created)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, Error> {
        // Nothing to write; behave like a read so absence still surfaces.
        if changes.is_empty() {
            return self.get_user(id).await;
        }

        self.user_repo
            .update(id, &changes)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn delete_user(&self, id: UserId) -> Result<User, Error> {
        let deleted = self
            .user_repo
            .delete(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(id))?;
        debug!(user_id = %id, "user deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
