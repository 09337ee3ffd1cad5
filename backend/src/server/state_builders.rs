//! Builders wiring persistence adapters into HTTP state.

use std::sync::Arc;

use actix_web::web;

use user_service::domain::UserService;
use user_service::inbound::http::state::HttpState;
use user_service::outbound::persistence::DieselUserRepository;

use super::ServerConfig;

/// Build handler state backed by the configured database pool.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let repository = Arc::new(DieselUserRepository::new(config.db_pool.clone()));
    let service = Arc::new(UserService::new(repository));
    web::Data::new(HttpState::from_service(service))
}
