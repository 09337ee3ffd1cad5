//! Signal-driven graceful shutdown.
//!
//! Actix's own signal handling is disabled so the probes can fail before the
//! listener closes: on SIGINT/SIGTERM both probes flip to 503, the grace
//! period lets orchestrators observe that, and only then is the server asked
//! to stop and finish in-flight requests.

use std::future::Future;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::web;
use tracing::{info, warn};

use user_service::inbound::http::health::HealthState;

/// Resolve on Ctrl-C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use actix_web::rt::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(error) => {
                warn!(%error, "SIGTERM handler unavailable; waiting for Ctrl-C only");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(error) = actix_web::rt::signal::ctrl_c().await {
        warn!(%error, "Ctrl-C handler failed");
        std::future::pending::<()>().await;
    }
}

/// Wait for `signal`, mark the service unhealthy, hold for `grace`, then stop
/// the server gracefully.
pub async fn drain_on<F>(
    signal: F,
    health_state: web::Data<HealthState>,
    handle: ServerHandle,
    grace: Duration,
) where
    F: Future<Output = ()>,
{
    signal.await;
    health_state.mark_unhealthy();
    info!(grace_secs = grace.as_secs_f64(), "shutdown requested; probes now failing");
    if !grace.is_zero() {
        actix_web::rt::time::sleep(grace).await;
    }
    handle.stop(true).await;
}
