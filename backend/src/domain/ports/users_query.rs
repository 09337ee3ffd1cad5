//! Driving port for user reads.
//!
//! Inbound adapters call this port without knowing which repository backs
//! it.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Read use-cases of the user resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return every user.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Return one user, or a `not_found` error when it does not exist.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;
}
