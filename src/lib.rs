//! Grid demand-response coordinator.
//!
//! Collects power demand requests from consumers, ranks them by consumer
//! class, and places them on capacity-bounded substations. Requests that fit
//! nowhere are shed. Maintenance windows take substations offline.

/// TOML configuration and presets.
pub mod config;
pub mod grid;
pub mod io;
pub mod repl;
/// Clock, workload generation, batch runs, and KPIs.
pub mod sim;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "tui")]
pub mod tui;
