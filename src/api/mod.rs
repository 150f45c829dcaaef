//! REST API for a finished simulation run.
//!
//! Provides two GET endpoints:
//! - `/state`: simulation config, KPI report, final battery and latest record
//! - `/telemetry`: timestep records with optional range filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::devices::BatteryState;
use crate::sim::kpi::KpiReport;
use crate::sim::types::{SimConfig, TimestepRecord};

pub use types::{ErrorResponse, StateResponse, TelemetryQuery};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the simulation run completes and wrapped in
/// `Arc`; all data is read-only so no locks are needed.
pub struct AppState {
    /// Simulation timing used for this run.
    pub config: SimConfig,
    /// Name of the dispatch policy.
    pub controller: String,
    /// Aggregate KPI report.
    pub kpi: KpiReport,
    /// Per-timestep records.
    pub records: Vec<TimestepRecord>,
    /// Battery state after the last timestep.
    pub final_battery: BatteryState,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/telemetry", get(handlers::get_telemetry))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr` or the
/// server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
