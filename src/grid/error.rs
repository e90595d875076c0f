//! Error taxonomy for grid intake and setup.
//!
//! Every variant is local and recoverable: the call that produced it left the
//! scheduler untouched. Capacity shortfalls are *not* errors; a request that
//! cannot be placed ends in [`RequestState::Shed`](super::request::RequestState::Shed).

use thiserror::Error;

use super::request::RequestState;
use crate::sim::clock::Timestamp;

/// Errors returned by the grid model and the scheduler's entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// The consumer class token is not one of the known classes.
    #[error("invalid consumer class '{0}' (expected res, com, or ind)")]
    InvalidClass(String),

    /// Requested power must be a finite, strictly positive number of MW.
    #[error("invalid demand of {megawatts} MW for '{consumer_id}': must be finite and > 0")]
    InvalidDemand { consumer_id: String, megawatts: f64 },

    /// Substation capacity must be a finite, strictly positive number of MW.
    #[error("invalid capacity of {capacity_mw} MW for substation '{id}': must be finite and > 0")]
    InvalidCapacity { id: String, capacity_mw: f64 },

    /// A substation with this id is already registered.
    #[error("substation '{0}' is already registered")]
    DuplicateSubstation(String),

    /// No substation with this id is registered.
    #[error("unknown substation '{0}'")]
    UnknownSubstation(String),

    /// Maintenance window ends before it starts.
    #[error("maintenance window for '{substation_id}' ends at {end} before it starts at {start}")]
    InvalidWindow {
        substation_id: String,
        start: Timestamp,
        end: Timestamp,
    },

    /// Released power must be a finite, non-negative number of MW.
    #[error("invalid release of {megawatts} MW on substation '{id}': must be finite and >= 0")]
    InvalidRelease { id: String, megawatts: f64 },

    /// Only freshly created requests can enter the pending ordering.
    #[error("request from '{consumer_id}' was already received (state {state})")]
    AlreadyReceived {
        consumer_id: String,
        state: RequestState,
    },
}
