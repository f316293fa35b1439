//! REST API for driving scenario simulations over a loaded baseline.
//!
//! Provides two endpoints:
//! - `GET /state` — baseline series summary (sample count, span, peak)
//! - `POST /simulate` — scenario parameters in, KPI report and adjusted
//!   series out

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::scenario::EngineSettings;
use crate::series::LoadSeries;

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the baseline loads and wrapped in `Arc` — no locks
/// needed since the baseline is read-only and every simulation allocates its
/// own adjusted series.
pub struct AppState {
    /// Baseline demand series every simulation starts from.
    pub baseline: LoadSeries,
    /// Engine settings applied to every scenario.
    pub settings: EngineSettings,
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
        .route("/state", get(handlers::get_state))
        .route("/simulate", post(handlers::post_simulate))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
