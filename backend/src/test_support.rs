//! Test utilities shared by unit tests and integration tests in `tests/`.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserChanges, UserDraft, UserId};

#[derive(Debug, Default)]
struct Store {
    next_id: i32,
    rows: BTreeMap<UserId, User>,
}

/// In-memory [`UserRepository`] mirroring the PostgreSQL adapter: ids come
/// from a sequence, emails are unique, and listing is ordered by id.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use user_service::domain::UserService;
/// use user_service::test_support::InMemoryUserRepository;
///
/// let service = UserService::new(Arc::new(InMemoryUserRepository::default()));
/// # let _ = service;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: Mutex<Store>,
    unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    /// Make every subsequent call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, UserPersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UserPersistenceError::connection("in-memory store offline"));
        }
        self.store
            .lock()
            .map_err(|_| UserPersistenceError::query("in-memory store poisoned"))
    }
}

fn email_taken(store: &Store, email: &str, except: Option<UserId>) -> bool {
    store
        .rows
        .values()
        .any(|user| user.email().as_ref() == email && Some(user.id()) != except)
}

fn apply_changes(user: &User, changes: &UserChanges, updated_at: DateTime<Utc>) -> User {
    User::new(UserDraft {
        id: user.id(),
        email: changes.email().unwrap_or(user.email()).clone(),
        name: match changes.name() {
            Some(name) => name.cloned(),
            None => user.name().cloned(),
        },
        created_at: user.created_at(),
        updated_at,
    })
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.store()?.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.store()?.rows.get(&id).cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut store = self.store()?;
        if email_taken(&store, user.email().as_ref(), None) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }

        store.next_id += 1;
        let id = UserId::new(store.next_id)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let now = Utc::now();
        let created = User::new(UserDraft {
            id,
            email: user.email().clone(),
            name: user.name().cloned(),
            created_at: now,
            updated_at: now,
        });
        store.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut store = self.store()?;
        if let Some(email) = changes.email() {
            if email_taken(&store, email.as_ref(), Some(id)) {
                return Err(UserPersistenceError::duplicate_email(email.as_ref()));
            }
        }

        let Some(current) = store.rows.get(&id) else {
            return Ok(None);
        };
        let updated = apply_changes(current, changes, Utc::now());
        store.rows.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.store()?.rows.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser::try_from_strings(email, None).expect("valid payload")
    }

    #[tokio::test]
    async fn ids_increase_and_listing_is_ordered() {
        let repo = InMemoryUserRepository::default();
        let first = repo.insert(&new_user("a@example.com")).await.expect("insert");
        let second = repo.insert(&new_user("b@example.com")).await.expect("insert");

        assert!(first.id() < second.id());
        let ids: Vec<_> = repo
            .list()
            .await
            .expect("list")
            .iter()
            .map(User::id)
            .collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::default();
        repo.insert(&new_user("a@example.com")).await.expect("insert");

        let err = repo
            .insert(&new_user("a@example.com"))
            .await
            .expect_err("duplicate");

        assert_eq!(err, UserPersistenceError::duplicate_email("a@example.com"));
    }

    #[tokio::test]
    async fn update_to_another_users_email_is_rejected() {
        let repo = InMemoryUserRepository::default();
        repo.insert(&new_user("a@example.com")).await.expect("insert");
        let second = repo.insert(&new_user("b@example.com")).await.expect("insert");
        let changes = UserChanges::try_from_strings(Some("a@example.com".to_owned()), None)
            .expect("valid changes");

        let err = repo
            .update(second.id(), &changes)
            .await
            .expect_err("duplicate");

        assert_eq!(err, UserPersistenceError::duplicate_email("a@example.com"));
    }

    #[tokio::test]
    async fn update_keeping_own_email_is_allowed() {
        let repo = InMemoryUserRepository::default();
        let user = repo.insert(&new_user("a@example.com")).await.expect("insert");
        let changes = UserChanges::try_from_strings(Some("a@example.com".to_owned()), None)
            .expect("valid changes");

        let updated = repo
            .update(user.id(), &changes)
            .await
            .expect("update")
            .expect("row exists");

        assert_eq!(updated.email(), user.email());
    }

    #[tokio::test]
    async fn update_applies_only_submitted_fields() {
        let repo = InMemoryUserRepository::default();
        let user = repo
            .insert(&NewUser::try_from_strings("a@example.com", Some("Ada".to_owned())).expect("valid"))
            .await
            .expect("insert");

        let renamed = UserChanges::try_from_strings(None, Some(Some("Countess".to_owned())))
            .expect("valid changes");
        let updated = repo
            .update(user.id(), &renamed)
            .await
            .expect("update")
            .expect("row exists");
        assert_eq!(updated.email(), user.email());
        assert_eq!(updated.name().map(AsRef::as_ref), Some("Countess"));
        assert_eq!(updated.created_at(), user.created_at());

        let cleared = UserChanges::try_from_strings(None, Some(None)).expect("valid changes");
        let unnamed = repo
            .update(user.id(), &cleared)
            .await
            .expect("update")
            .expect("row exists");
        assert!(unnamed.name().is_none());
        assert_eq!(unnamed.email(), user.email());
    }

    #[tokio::test]
    async fn offline_store_reports_connection_error() {
        let repo = InMemoryUserRepository::default();
        repo.set_unavailable(true);

        let err = repo.list().await.expect_err("offline");

        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }
}
