//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// Construct state from the user query and command ports.
    ///
    /// # Examples
    /// ```ignore
    /// use std::sync::Arc;
    ///
    /// use user_service::domain::UserService;
    /// use user_service::inbound::http::state::HttpState;
    /// use user_service::test_support::InMemoryUserRepository;
    ///
    /// let service = Arc::new(UserService::new(Arc::new(InMemoryUserRepository::default())));
    /// let state = HttpState::new(service.clone(), service);
    /// let _users = state.users.clone();
    /// ```
    pub fn new(users: Arc<dyn UsersQuery>, users_command: Arc<dyn UsersCommand>) -> Self {
        Self {
            users,
            users_command,
        }
    }

    /// Construct state where one value serves both ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: UsersQuery + UsersCommand + 'static,
    {
        Self::new(service.clone(), service)
    }
}
