//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use grid_dr::config::GridConfig;
use grid_dr::grid::{DemandRequest, PriorityClass, Scheduler};
use grid_dr::sim::clock::{ManualClock, Timestamp};

/// Fixed start instant for manual clocks.
pub const T0: Timestamp = 1_700_000_000;

/// Scheduler on a manual clock at `T0` with the given substations.
pub fn grid(subs: &[(&str, f64)]) -> Scheduler<ManualClock> {
    let mut s = Scheduler::new(ManualClock::new(T0));
    for (id, cap) in subs {
        s.add_substation(*id, *cap)
            .expect("fixture substation should register");
    }
    s
}

/// The reference three-substation grid (S01=50, S02=40, S03=60).
pub fn reference_grid() -> Scheduler<ManualClock> {
    grid(&[("S01", 50.0), ("S02", 40.0), ("S03", 60.0)])
}

/// Submits a request stamped with the scheduler's current time.
pub fn submit(s: &mut Scheduler<ManualClock>, id: &str, class: PriorityClass, mw: f64) {
    let at = s.now();
    let req = DemandRequest::new(id, class, mw, at).expect("fixture demand should be valid");
    s.receive_demand(req).expect("fixture demand should queue");
}

/// Baseline config shortened to `cycles`.
pub fn short_config(cycles: usize) -> GridConfig {
    let mut cfg = GridConfig::baseline();
    cfg.simulation.cycles = cycles;
    cfg
}
