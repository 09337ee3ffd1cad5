//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserChanges, UserId};

/// Write use-cases of the user resource.
///
/// Every operation returns the affected user: the created row, the row after
/// the update, or the row as it was before deletion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create a user from a validated payload.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    /// Apply the submitted fields to an existing user.
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, Error>;

    /// Delete a user.
    async fn delete_user(&self, id: UserId) -> Result<User, Error>;
}
