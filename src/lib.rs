//! Day-long solar production, battery storage and grid release simulator.

/// Command-line argument parsing.
pub mod cli;
pub mod config;
pub mod devices;
/// Telemetry export.
pub mod io;
pub mod reporting;
pub mod signal;
/// Simulation engine, controllers and KPIs.
pub mod sim;

/// REST API for inspecting a finished run.
#[cfg(feature = "api")]
pub mod api;
/// Terminal replay of a run.
#[cfg(feature = "tui")]
pub mod tui;
