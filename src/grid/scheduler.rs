//! Demand-response scheduler: priority ordering, first-fit allocation, and
//! maintenance gating.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::GridError;
use super::maintenance::{MaintenanceId, MaintenanceJob};
use super::queue::DemandQueue;
use super::request::{DemandRequest, RequestState};
use super::snapshot::{GridSnapshot, MaintenanceStatus, PendingDemand, SubstationStatus};
use super::substation::Substation;
use crate::sim::clock::{Clock, Timestamp};

/// What happened to one request during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The request, in its terminal state.
    pub request: DemandRequest,
    /// Substation that took the load; `None` when the request was shed.
    pub substation: Option<String>,
}

/// Result of one scheduling cycle.
///
/// Outcomes are listed in the order the requests were attempted. The report
/// is where terminal requests leave the scheduler; it keeps no reference to
/// them afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Instant the cycle was evaluated at.
    pub at: Timestamp,
    /// Attempted requests, highest priority first.
    pub outcomes: Vec<Outcome>,
    /// Requests put back into the pending ordering.
    pub requeued: usize,
}

impl CycleReport {
    /// Number of requests that were allocated.
    pub fn allocated_count(&self) -> usize {
        self.count(RequestState::Allocated)
    }

    /// Number of requests that were shed.
    pub fn shed_count(&self) -> usize {
        self.count(RequestState::Shed)
    }

    /// Total power allocated this cycle (MW).
    pub fn allocated_mw(&self) -> f64 {
        self.sum_mw(RequestState::Allocated)
    }

    /// Total power shed this cycle (MW).
    pub fn shed_mw(&self) -> f64 {
        self.sum_mw(RequestState::Shed)
    }

    fn count(&self, state: RequestState) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.request.state() == state)
            .count()
    }

    fn sum_mw(&self, state: RequestState) -> f64 {
        self.outcomes
            .iter()
            .filter(|o| o.request.state() == state)
            .map(|o| o.request.megawatts())
            .sum()
    }
}

/// Running totals across all cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub allocated_count: u64,
    pub allocated_mw: f64,
    pub shed_count: u64,
    pub shed_mw: f64,
}

/// Owns the grid: substations, pending requests, and maintenance jobs.
///
/// All mutation goes through `&mut self`, so a cycle always runs to
/// completion before the next intake call. Generic over `C: Clock` so tests
/// and simulations can drive time explicitly.
///
/// # Examples
///
/// ```
/// use grid_dr::grid::request::{DemandRequest, PriorityClass, RequestState};
/// use grid_dr::grid::scheduler::Scheduler;
/// use grid_dr::sim::clock::ManualClock;
///
/// let mut grid = Scheduler::new(ManualClock::new(0));
/// grid.add_substation("S01", 50.0).unwrap();
/// grid.receive_demand(DemandRequest::new("C1", PriorityClass::Industrial, 30.0, 0).unwrap())
///     .unwrap();
///
/// let report = grid.run_cycle();
/// assert_eq!(report.outcomes[0].request.state(), RequestState::Allocated);
/// assert_eq!(grid.substation("S01").map(|s| s.used_mw()), Some(30.0));
/// ```
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    clock: C,
    substations: Vec<Substation>,
    pending: DemandQueue,
    maintenance: Vec<MaintenanceJob>,
    cycles: u64,
    totals: Totals,
}

impl<C: Clock> Scheduler<C> {
    /// Creates an empty grid reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            substations: Vec::new(),
            pending: DemandQueue::new(),
            maintenance: Vec::new(),
            cycles: 0,
            totals: Totals::default(),
        }
    }

    /// Returns the scheduler's time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current instant according to the scheduler's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Registers a substation. Registration order is allocation order.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidCapacity`] for a non-finite or non-positive
    /// capacity, [`GridError::DuplicateSubstation`] if the id is taken.
    pub fn add_substation(
        &mut self,
        id: impl Into<String>,
        capacity_mw: f64,
    ) -> Result<(), GridError> {
        let id = id.into();
        if !capacity_mw.is_finite() || capacity_mw <= 0.0 {
            return Err(GridError::InvalidCapacity { id, capacity_mw });
        }
        if self.substations.iter().any(|s| s.id() == id) {
            return Err(GridError::DuplicateSubstation(id));
        }
        debug!(substation = %id, capacity_mw, "substation registered");
        self.substations.push(Substation::new(id, capacity_mw));
        Ok(())
    }

    /// Accepts a freshly created request and queues it.
    ///
    /// # Errors
    ///
    /// [`GridError::AlreadyReceived`] if the request is not in the `Created`
    /// state (for example a request handed back by an earlier cycle).
    pub fn receive_demand(&mut self, mut request: DemandRequest) -> Result<(), GridError> {
        if request.state() != RequestState::Created {
            return Err(GridError::AlreadyReceived {
                consumer_id: request.consumer_id().to_string(),
                state: request.state(),
            });
        }
        request.set_state(RequestState::Queued);
        debug!(
            consumer = request.consumer_id(),
            class = %request.class(),
            mw = request.megawatts(),
            "demand queued"
        );
        self.pending.push(request);
        Ok(())
    }

    /// Schedules maintenance on `substation_id` for `[start, end)`.
    ///
    /// The id is not checked against registered substations: a job for an
    /// unknown id is accepted and stays inert.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidWindow`] if `end < start`.
    pub fn schedule_maintenance(
        &mut self,
        substation_id: impl Into<String>,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<MaintenanceId, GridError> {
        let substation_id = substation_id.into();
        if end < start {
            return Err(GridError::InvalidWindow {
                substation_id,
                start,
                end,
            });
        }
        if self.substation(&substation_id).is_none() {
            warn!(substation = %substation_id, "maintenance scheduled for unknown substation; it will have no effect");
        }
        let id = MaintenanceId(self.maintenance.len());
        info!(job = id.0, substation = %substation_id, start, end, "maintenance scheduled");
        self.maintenance
            .push(MaintenanceJob::new(substation_id, start, end));
        Ok(id)
    }

    /// Schedules a window of `duration_secs` starting `delay_secs` from now.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidWindow`] if `duration_secs` is negative.
    pub fn schedule_maintenance_after(
        &mut self,
        substation_id: impl Into<String>,
        delay_secs: i64,
        duration_secs: i64,
    ) -> Result<MaintenanceId, GridError> {
        let start = self.now().saturating_add(delay_secs);
        let end = start.saturating_add(duration_secs);
        self.schedule_maintenance(substation_id, start, end)
    }

    /// Runs one cycle at the clock's current time.
    pub fn run_cycle(&mut self) -> CycleReport {
        let now = self.clock.now();
        self.run_cycle_at(now)
    }

    /// Runs one cycle evaluated at `now`.
    ///
    /// 1. Advance maintenance and recompute which substations are online.
    /// 2. Drain pending requests, highest priority first.
    /// 3. Place each on the first substation (registration order) with room;
    ///    otherwise shed it.
    /// 4. Put back anything still `Queued`.
    pub fn run_cycle_at(&mut self, now: Timestamp) -> CycleReport {
        self.advance_maintenance(now);

        let mut attempted = Vec::with_capacity(self.pending.len());
        for mut request in self.pending.drain_ordered() {
            let substation = self.place(&request);
            if let Some(ref id) = substation {
                request.set_state(RequestState::Allocated);
                debug!(
                    consumer = request.consumer_id(),
                    class = %request.class(),
                    mw = request.megawatts(),
                    substation = %id,
                    "demand allocated"
                );
            } else {
                request.set_state(RequestState::Shed);
                debug!(
                    consumer = request.consumer_id(),
                    class = %request.class(),
                    mw = request.megawatts(),
                    "demand shed"
                );
            }
            attempted.push(Outcome {
                request,
                substation,
            });
        }

        // No policy leaves a request Queued today; the pass keeps the hook.
        let (still_queued, outcomes): (Vec<Outcome>, Vec<Outcome>) = attempted
            .into_iter()
            .partition(|o| o.request.state() == RequestState::Queued);
        let requeued = still_queued.len();
        for outcome in still_queued {
            self.pending.push(outcome.request);
        }

        self.cycles += 1;
        let report = CycleReport {
            cycle: self.cycles,
            at: now,
            outcomes,
            requeued,
        };

        self.totals.allocated_count += report.allocated_count() as u64;
        self.totals.allocated_mw += report.allocated_mw();
        self.totals.shed_count += report.shed_count() as u64;
        self.totals.shed_mw += report.shed_mw();

        info!(
            cycle = report.cycle,
            at = now,
            allocated = report.allocated_count(),
            allocated_mw = report.allocated_mw(),
            shed = report.shed_count(),
            shed_mw = report.shed_mw(),
            requeued,
            "cycle complete"
        );
        report
    }

    /// Releases `mw` previously allocated on `substation_id`.
    ///
    /// Not used by the scheduling cycle.
    ///
    /// # Errors
    ///
    /// [`GridError::UnknownSubstation`] if no such substation exists,
    /// [`GridError::InvalidRelease`] for a negative or non-finite amount.
    pub fn release(&mut self, substation_id: &str, mw: f64) -> Result<(), GridError> {
        if !mw.is_finite() || mw < 0.0 {
            return Err(GridError::InvalidRelease {
                id: substation_id.to_string(),
                megawatts: mw,
            });
        }
        let sub = self
            .substations
            .iter_mut()
            .find(|s| s.id() == substation_id)
            .ok_or_else(|| GridError::UnknownSubstation(substation_id.to_string()))?;
        sub.deallocate(mw);
        debug!(substation = substation_id, mw, "capacity released");
        Ok(())
    }

    /// Substations in registration order.
    pub fn substations(&self) -> &[Substation] {
        &self.substations
    }

    /// Looks up a substation by id.
    pub fn substation(&self, id: &str) -> Option<&Substation> {
        self.substations.iter().find(|s| s.id() == id)
    }

    /// Pending requests in the order the next cycle will attempt them.
    pub fn pending(&self) -> Vec<&DemandRequest> {
        self.pending.ordered()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Every maintenance job ever scheduled, in scheduling order.
    pub fn maintenance_jobs(&self) -> &[MaintenanceJob] {
        &self.maintenance
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Read-only copy of the grid's current state.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            at: self.clock.now(),
            cycles: self.cycles,
            substations: self.substations.iter().map(SubstationStatus::from).collect(),
            pending: self
                .pending
                .ordered()
                .into_iter()
                .map(PendingDemand::from)
                .collect(),
            maintenance: self
                .maintenance
                .iter()
                .enumerate()
                .map(|(idx, job)| MaintenanceStatus {
                    id: idx,
                    substation_id: job.substation_id().to_string(),
                    start: job.start(),
                    end: job.end(),
                    state: job.state(),
                    known_substation: self.substation(job.substation_id()).is_some(),
                })
                .collect(),
            totals: self.totals,
        }
    }

    /// Advances every job, then derives each substation's online flag:
    /// online iff no job referencing it is in progress.
    fn advance_maintenance(&mut self, now: Timestamp) {
        for (idx, job) in self.maintenance.iter_mut().enumerate() {
            let before = job.state();
            let after = job.advance(now);
            if before != after {
                info!(
                    job = idx,
                    substation = job.substation_id(),
                    from = %before,
                    to = %after,
                    "maintenance transition"
                );
            }
        }

        for sub in &mut self.substations {
            let online = !self
                .maintenance
                .iter()
                .any(|job| job.is_in_progress() && job.substation_id() == sub.id());
            if online != sub.is_online() {
                info!(substation = sub.id(), online, "substation availability changed");
                sub.set_online(online);
            }
        }
    }

    /// First-fit placement in registration order.
    fn place(&mut self, request: &DemandRequest) -> Option<String> {
        self.substations
            .iter_mut()
            .find_map(|sub| sub.allocate(request.megawatts()).then(|| sub.id().to_string()))
    }
}
