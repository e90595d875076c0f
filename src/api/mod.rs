//! REST API over a live scheduler.
//!
//! Endpoints:
//! - `GET /status`: grid snapshot
//! - `POST /demands`: submit a demand request
//! - `POST /maintenance`: schedule a maintenance window relative to now
//! - `POST /balance`: run one scheduling cycle

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::sync::Mutex;
use tracing::info;

use crate::grid::Scheduler;
use crate::sim::clock::SystemClock;

pub use types::{
    BalanceResponse, DemandBody, ErrorResponse, MaintenanceBody, MaintenanceResponse,
    OutcomeRecord,
};

/// Application state shared across all request handlers.
///
/// The scheduler sits behind one async mutex, so intake and cycles are
/// serialized exactly as in the single-threaded interpreter.
pub struct AppState {
    /// The grid being coordinated.
    pub scheduler: Mutex<Scheduler<SystemClock>>,
    /// Window length used when `POST /maintenance` omits `duration_secs`.
    pub default_maintenance_secs: i64,
}

impl AppState {
    pub fn new(scheduler: Scheduler<SystemClock>, default_maintenance_secs: i64) -> Self {
        Self {
            scheduler: Mutex::new(scheduler),
            default_maintenance_secs,
        }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/demands", post(handlers::post_demand))
        .route("/maintenance", post(handlers::post_maintenance))
        .route("/balance", post(handlers::post_balance))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
