//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are converted back into domain users through the validated value
//! constructors, so a row that violates domain rules surfaces as a query
//! error rather than leaking out.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, NewUser, User, UserChanges, UserDraft, UserId, UserName,
};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    UserPersistenceError::connection(message)
}

/// Map Diesel errors to repository errors.
///
/// `email` is the address being written, if any; a unique violation on the
/// email constraint becomes [`UserPersistenceError::DuplicateEmail`].
fn map_diesel_error(error: DieselError, email: Option<&EmailAddress>) -> UserPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = ?info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let on_email = info
                .constraint_name()
                .is_none_or(|name| name == EMAIL_UNIQUE_CONSTRAINT);
            match email {
                Some(email) if on_email => UserPersistenceError::duplicate_email(email.as_ref()),
                _ => UserPersistenceError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        ) => UserPersistenceError::connection("database connection error"),
        DieselError::DatabaseError(_, info) => UserPersistenceError::query(info.message()),
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        email,
        name,
        created_at,
        updated_at,
    } = row;

    let invalid = |err| UserPersistenceError::query(format!("invalid user row {id}: {err}"));
    Ok(User::new(UserDraft {
        id: UserId::new(id).map_err(invalid)?,
        email: EmailAddress::new(email).map_err(invalid)?,
        name: name.map(UserName::new).transpose().map_err(invalid)?,
        created_at,
        updated_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        debug!(count = rows.len(), "loaded users");
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.value())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        row.map(row_to_user).transpose()
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            email: user.email().as_ref(),
            name: user.name().map(AsRef::as_ref),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(user.email())))?;

        debug!(user_id = row.id, "inserted user row");
        row_to_user(row)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserChangeset {
            email: changes.email().map(AsRef::as_ref),
            name: changes.name().map(|name| name.map(AsRef::as_ref)),
            updated_at: Utc::now(),
        };

        let row: Option<UserRow> = diesel::update(users::table.find(id.value()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, changes.email()))?;

        debug!(user_id = id.value(), found = row.is_some(), "updated user row");
        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = diesel::delete(users::table.find(id.value()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        debug!(user_id = id.value(), found = row.is_some(), "deleted user row");
        row.map(row_to_user).transpose()
    }
}
