//! Read-only JSON API over stored daily records.
//!
//! Provides three GET endpoints per home:
//! - `/homes/{home_id}/today` — the record for the server's current day
//! - `/homes/{home_id}/range` — daily totals over a window
//! - `/homes/{home_id}/comparison` — the home's average against all homes

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use chrono::NaiveDate;

use crate::record::MemoryStore;

pub use types::{DEFAULT_WINDOW_DAYS, ErrorResponse, WindowQuery};

/// Application state shared across all request handlers.
///
/// Handlers only read; the store's own lock covers any concurrent writer.
pub struct AppState {
    /// Records served by the API.
    pub store: MemoryStore,
    /// UTC day treated as "today" and as the default window end.
    pub today: NaiveDate,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/homes/{home_id}/today", get(handlers::get_today))
        .route("/homes/{home_id}/range", get(handlers::get_range))
        .route("/homes/{home_id}/comparison", get(handlers::get_comparison))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
