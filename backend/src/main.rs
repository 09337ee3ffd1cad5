//! User service entry-point: loads settings, connects the database pool and
//! serves the `/user` resource until shutdown.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServiceSettings, create_server, drain_on, shutdown_signal};
use user_service::inbound::http::health::HealthState;
use user_service::outbound::persistence::{DbPool, run_pending_migrations};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(error) if error.not_found() => {}
        Err(error) => warn!(%error, "failed to load .env file"),
    }

    let settings = ServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    let database_url = settings.database_url().map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    if settings.run_migrations {
        run_pending_migrations(&database_url)
            .await
            .map_err(io::Error::other)?;
    }

    let pool = DbPool::connect(settings.pool_config(database_url))
        .await
        .map_err(io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr, pool.clone());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::make_metrics());

    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on(
        shutdown_signal(),
        health_state,
        server.handle(),
        settings.shutdown_grace(),
    ));
    info!(%bind_addr, "user service listening");
    let result = server.await;

    pool.disconnect();
    info!("user service stopped");
    result
}
