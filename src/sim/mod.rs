/// Time sources for the scheduler.
pub mod clock;
pub mod kpi;
/// Batch simulation driver and per-cycle records.
pub mod runner;
pub mod workload;
