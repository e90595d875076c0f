//! Grid model and the demand-response scheduler.

pub mod error;
/// Maintenance windows and their state machine.
pub mod maintenance;
/// Priority ordering over pending requests.
pub mod queue;
/// Demand requests and consumer classes.
pub mod request;
pub mod scheduler;
pub mod snapshot;
/// Capacity-bounded substations.
pub mod substation;

pub use error::GridError;
pub use maintenance::{DEFAULT_MAINTENANCE_SECS, MaintenanceJob, MaintenanceState};
pub use request::{DemandRequest, PriorityClass, RequestState};
pub use scheduler::{CycleReport, Outcome, Scheduler, Totals};
pub use snapshot::GridSnapshot;
pub use substation::Substation;
