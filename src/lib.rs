//! Synthetic per-household CO2 emissions: simulation, daily records and rollups.

pub mod aggregate;
pub mod appliance;
pub mod batch;
pub mod config;
pub mod error;
pub mod factor;
pub mod io;
pub mod record;
/// Hourly emissions simulator and its building blocks.
pub mod sim;

#[cfg(feature = "api")]
pub mod api;
