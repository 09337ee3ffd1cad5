//! Driven port for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserChanges, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The unique email constraint rejected the write.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Storage operations backing the user resource.
///
/// Lookups and mutations addressed by id return `Ok(None)` when no row
/// matches; callers decide how to surface absence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch every stored user ordered by id.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a user and return the stored row.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Apply `changes` to the user and return the stored row.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user and return the row as it was before deletion.
    async fn delete(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;
}
