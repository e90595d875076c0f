//! Post-hoc KPI computation from simulation records.

use std::fmt;

use super::runner::CycleRecord;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<CycleRecord>` so the summary always agrees
/// with the exported per-cycle data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridKpi {
    /// Cycles in the run.
    pub cycles: usize,
    /// Requests submitted across all cycles.
    pub total_requests: usize,
    pub allocated_count: usize,
    pub allocated_mw: f64,
    pub shed_count: usize,
    pub shed_mw: f64,
    /// Share of requested MW that was allocated (0.0..=1.0).
    pub served_ratio: f64,
    /// Highest single-substation utilization seen after any cycle.
    pub peak_utilization: f64,
    /// Sum over cycles of the number of offline substations.
    pub offline_substation_cycles: usize,
}

impl GridKpi {
    /// Computes all KPIs from the complete record vector.
    ///
    /// # Arguments
    ///
    /// * `records` - Per-cycle simulation records
    ///
    /// # Returns
    ///
    /// A `GridKpi` with all fields populated; all zero for an empty run.
    pub fn from_records(records: &[CycleRecord]) -> Self {
        let mut kpi = Self {
            cycles: records.len(),
            ..Self::default()
        };

        for r in records {
            kpi.total_requests += r.submitted;
            kpi.allocated_count += r.allocated;
            kpi.allocated_mw += r.allocated_mw;
            kpi.shed_count += r.shed;
            kpi.shed_mw += r.shed_mw;
            kpi.peak_utilization = kpi.peak_utilization.max(r.peak_utilization);
            kpi.offline_substation_cycles += r.offline_substations.len();
        }

        let requested = kpi.allocated_mw + kpi.shed_mw;
        kpi.served_ratio = if requested > 0.0 {
            kpi.allocated_mw / requested
        } else {
            0.0
        };
        kpi
    }
}

impl fmt::Display for GridKpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Cycles:                {}", self.cycles)?;
        writeln!(f, "Requests:              {}", self.total_requests)?;
        writeln!(
            f,
            "Allocated:             {} ({:.1} MW)",
            self.allocated_count, self.allocated_mw
        )?;
        writeln!(
            f,
            "Shed:                  {} ({:.1} MW)",
            self.shed_count, self.shed_mw
        )?;
        writeln!(f, "Served:                {:.1}%", self.served_ratio * 100.0)?;
        writeln!(
            f,
            "Peak utilization:      {:.1}%",
            self.peak_utilization * 100.0
        )?;
        write!(
            f,
            "Offline sub-cycles:    {}",
            self.offline_substation_cycles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(allocated_mw: f64, shed_mw: f64, util: f64, offline: usize) -> CycleRecord {
        CycleRecord {
            cycle: 1,
            at: 0,
            submitted: 2,
            allocated: 1,
            allocated_mw,
            shed: 1,
            shed_mw,
            pending: 0,
            offline_substations: (0..offline).map(|i| format!("S{i}")).collect(),
            peak_utilization: util,
            outcomes: Vec::new(),
        }
    }

    #[test]
    fn empty_results() {
        let kpi = GridKpi::from_records(&[]);
        assert_eq!(kpi, GridKpi::default());
    }

    #[test]
    fn sums_and_ratio() {
        let records = vec![make_record(30.0, 10.0, 0.6, 0), make_record(10.0, 0.0, 0.8, 1)];
        let kpi = GridKpi::from_records(&records);
        assert_eq!(kpi.cycles, 2);
        assert_eq!(kpi.total_requests, 4);
        assert_eq!(kpi.allocated_count, 2);
        assert!((kpi.allocated_mw - 40.0).abs() < 1e-9);
        assert!((kpi.shed_mw - 10.0).abs() < 1e-9);
        assert!((kpi.served_ratio - 0.8).abs() < 1e-9);
        assert!((kpi.peak_utilization - 0.8).abs() < 1e-9);
        assert_eq!(kpi.offline_substation_cycles, 1);
    }

    #[test]
    fn nothing_requested_serves_zero() {
        let kpi = GridKpi::from_records(&[make_record(0.0, 0.0, 0.0, 0)]);
        assert_eq!(kpi.served_ratio, 0.0);
    }

    #[test]
    fn display_format() {
        let kpi = GridKpi::from_records(&[make_record(30.0, 10.0, 0.6, 2)]);
        let s = kpi.to_string();
        assert!(s.starts_with("--- KPI Report ---"));
        assert!(s.contains("Served:                75.0%"));
        assert!(s.contains("Offline sub-cycles:    2"));
    }
}
