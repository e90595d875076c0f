//! Batch simulation: drives a scheduler on a manual clock with generated demand.

use std::fmt;

use crate::config::GridConfig;
use crate::grid::{GridError, Outcome, Scheduler};
use crate::sim::clock::{Clock, ManualClock, Timestamp};
use crate::sim::workload::DemandGenerator;

/// Everything observed in one simulated cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Simulated time the cycle ran at.
    pub at: Timestamp,
    /// Requests generated and submitted before the cycle.
    pub submitted: usize,
    pub allocated: usize,
    pub allocated_mw: f64,
    pub shed: usize,
    pub shed_mw: f64,
    /// Requests still pending after the cycle.
    pub pending: usize,
    /// Substations offline during the cycle.
    pub offline_substations: Vec<String>,
    /// Highest substation utilization after the cycle (0.0..=1.0).
    pub peak_utilization: f64,
    /// Terminal requests handed back by the scheduler.
    pub outcomes: Vec<Outcome>,
}

impl fmt::Display for CycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle {:>3} @ {}: {} submitted, {} allocated ({:.1} MW), {} shed ({:.1} MW), peak {:.0}%",
            self.cycle,
            self.at,
            self.submitted,
            self.allocated,
            self.allocated_mw,
            self.shed,
            self.shed_mw,
            self.peak_utilization * 100.0
        )?;
        if !self.offline_substations.is_empty() {
            write!(f, ", offline: {}", self.offline_substations.join(","))?;
        }
        Ok(())
    }
}

/// A configured grid run for a fixed number of cycles.
///
/// # Examples
///
/// ```
/// use grid_dr::config::GridConfig;
/// use grid_dr::sim::runner::Simulation;
///
/// let mut cfg = GridConfig::baseline();
/// cfg.simulation.cycles = 4;
/// let records = Simulation::from_config(&cfg).unwrap().run().unwrap();
/// assert_eq!(records.len(), 4);
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: GridConfig,
    scheduler: Scheduler<ManualClock>,
    generator: DemandGenerator,
    cycles_run: usize,
}

impl Simulation {
    /// Builds the grid, registers planned maintenance, and seeds demand.
    ///
    /// # Errors
    ///
    /// Returns a `GridError` if a substation or window is rejected; a config
    /// that passes [`GridConfig::validate`] never does.
    ///
    /// # Panics
    ///
    /// Panics if the workload section is invalid (see [`DemandGenerator::new`]).
    pub fn from_config(config: &GridConfig) -> Result<Self, GridError> {
        let start = config.simulation.start_time;
        let mut scheduler = config.build_scheduler(ManualClock::new(start))?;
        for window in &config.maintenance.windows {
            let opens = start.saturating_add(window.start_offset_secs);
            scheduler.schedule_maintenance(
                window.substation_id.clone(),
                opens,
                opens.saturating_add(window.duration_secs),
            )?;
        }
        let generator = DemandGenerator::new(&config.workload, config.simulation.seed);

        Ok(Self {
            config: config.clone(),
            scheduler,
            generator,
            cycles_run: 0,
        })
    }

    /// Restarts from the configuration this simulation was built with.
    ///
    /// # Errors
    ///
    /// Same as [`Simulation::from_config`].
    pub fn reset(&mut self) -> Result<(), GridError> {
        *self = Self::from_config(&self.config)?;
        Ok(())
    }

    /// Generates a batch, runs one cycle, then advances the clock by one
    /// interval.
    ///
    /// # Errors
    ///
    /// Propagates intake errors from the scheduler.
    pub fn step(&mut self) -> Result<CycleRecord, GridError> {
        let at = self.scheduler.now();
        let batch = self.generator.generate(at)?;
        let submitted = batch.len();
        for request in batch {
            self.scheduler.receive_demand(request)?;
        }

        let report = self.scheduler.run_cycle();
        let offline_substations = self
            .scheduler
            .substations()
            .iter()
            .filter(|s| !s.is_online())
            .map(|s| s.id().to_string())
            .collect();
        let peak_utilization = self
            .scheduler
            .substations()
            .iter()
            .map(|s| s.utilization())
            .fold(0.0_f64, f64::max);

        let record = CycleRecord {
            cycle: report.cycle,
            at: report.at,
            submitted,
            allocated: report.allocated_count(),
            allocated_mw: report.allocated_mw(),
            shed: report.shed_count(),
            shed_mw: report.shed_mw(),
            pending: self.scheduler.pending_len(),
            offline_substations,
            peak_utilization,
            outcomes: report.outcomes,
        };

        self.scheduler
            .clock()
            .advance(self.config.simulation.cycle_interval_secs);
        self.cycles_run += 1;
        Ok(record)
    }

    /// Runs all remaining cycles and returns their records in order.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`Simulation::step`].
    pub fn run(mut self) -> Result<Vec<CycleRecord>, GridError> {
        let mut records = Vec::with_capacity(self.remaining());
        while !self.is_finished() {
            records.push(self.step()?);
        }
        Ok(records)
    }

    /// Cycles left before the configured total is reached.
    pub fn remaining(&self) -> usize {
        self.config.simulation.cycles.saturating_sub(self.cycles_run)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    pub fn cycles_run(&self) -> usize {
        self.cycles_run
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler<ManualClock> {
        &self.scheduler
    }

    /// Mutable access for interactive frontends (e.g. ad hoc maintenance).
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<ManualClock> {
        &mut self.scheduler
    }
}
