//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::grid::{CycleReport, Outcome, PriorityClass, RequestState};
use crate::sim::clock::Timestamp;

/// `POST /demands` body.
#[derive(Debug, Deserialize)]
pub struct DemandBody {
    pub consumer_id: String,
    /// `res`, `com`, `ind`, or the full class name.
    pub class: String,
    pub megawatts: f64,
}

/// `POST /maintenance` body.
#[derive(Debug, Deserialize)]
pub struct MaintenanceBody {
    pub substation_id: String,
    /// Seconds from now until the window opens.
    pub delay_secs: i64,
    /// Window length; the server default when omitted.
    pub duration_secs: Option<i64>,
}

/// Created maintenance window.
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub id: usize,
    pub substation_id: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

/// One attempted request in a cycle.
#[derive(Debug, Serialize)]
pub struct OutcomeRecord {
    pub consumer_id: String,
    pub class: PriorityClass,
    pub megawatts: f64,
    pub state: RequestState,
    /// Substation that took the load; absent for shed requests.
    pub substation: Option<String>,
}

impl From<&Outcome> for OutcomeRecord {
    fn from(o: &Outcome) -> Self {
        Self {
            consumer_id: o.request.consumer_id().to_string(),
            class: o.request.class(),
            megawatts: o.request.megawatts(),
            state: o.request.state(),
            substation: o.substation.clone(),
        }
    }
}

/// `POST /balance` response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub cycle: u64,
    pub at: Timestamp,
    pub allocated_count: usize,
    pub allocated_mw: f64,
    pub shed_count: usize,
    pub shed_mw: f64,
    /// Attempted requests, highest priority first.
    pub outcomes: Vec<OutcomeRecord>,
}

impl From<&CycleReport> for BalanceResponse {
    fn from(r: &CycleReport) -> Self {
        Self {
            cycle: r.cycle,
            at: r.at,
            allocated_count: r.allocated_count(),
            allocated_mw: r.allocated_mw(),
            shed_count: r.shed_count(),
            shed_mw: r.shed_mw(),
            outcomes: r.outcomes.iter().map(OutcomeRecord::from).collect(),
        }
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
