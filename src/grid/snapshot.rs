//! Read-only view of the grid for display and the API.

use std::fmt;

use serde::Serialize;

use super::maintenance::MaintenanceState;
use super::request::{DemandRequest, PriorityClass};
use super::scheduler::Totals;
use super::substation::Substation;
use crate::sim::clock::Timestamp;

/// Point-in-time copy of everything the scheduler owns.
#[derive(Debug, Clone, Serialize)]
pub struct GridSnapshot {
    /// Instant the snapshot was taken.
    pub at: Timestamp,
    /// Cycles run so far.
    pub cycles: u64,
    /// Substations in registration (allocation) order.
    pub substations: Vec<SubstationStatus>,
    /// Pending requests in dequeue order.
    pub pending: Vec<PendingDemand>,
    /// All maintenance jobs, in scheduling order.
    pub maintenance: Vec<MaintenanceStatus>,
    /// Running allocation and shed totals.
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstationStatus {
    pub id: String,
    pub used_mw: f64,
    pub capacity_mw: f64,
    pub available_mw: f64,
    pub online: bool,
}

impl From<&Substation> for SubstationStatus {
    fn from(s: &Substation) -> Self {
        Self {
            id: s.id().to_string(),
            used_mw: s.used_mw(),
            capacity_mw: s.capacity_mw(),
            available_mw: s.available_mw(),
            online: s.is_online(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingDemand {
    pub consumer_id: String,
    pub class: PriorityClass,
    pub megawatts: f64,
    pub created_at: Timestamp,
}

impl From<&DemandRequest> for PendingDemand {
    fn from(r: &DemandRequest) -> Self {
        Self {
            consumer_id: r.consumer_id().to_string(),
            class: r.class(),
            megawatts: r.megawatts(),
            created_at: r.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceStatus {
    /// Index into the maintenance list.
    pub id: usize,
    pub substation_id: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub state: MaintenanceState,
    /// Whether `substation_id` names a registered substation.
    pub known_substation: bool,
}

impl GridSnapshot {
    /// Ids of substations currently offline.
    pub fn offline(&self) -> Vec<&str> {
        self.substations
            .iter()
            .filter(|s| !s.online)
            .map(|s| s.id.as_str())
            .collect()
    }
}

impl fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Grid Status ---")?;

        writeln!(f, "Substations:")?;
        for s in &self.substations {
            let state = if s.online { "ONLINE" } else { "OFFLINE" };
            writeln!(f, "  {}: {}/{} MW ({state})", s.id, s.used_mw, s.capacity_mw)?;
        }

        writeln!(f, "Pending Demands:")?;
        for p in &self.pending {
            writeln!(
                f,
                "  {} ({}MW, pr={})",
                p.consumer_id,
                p.megawatts,
                p.class.rank()
            )?;
        }

        write!(f, "Maintenance Jobs:")?;
        for m in &self.maintenance {
            let note = if m.known_substation {
                ""
            } else {
                " (unknown substation)"
            };
            write!(
                f,
                "\n  {} [{}] {}..{}{note}",
                m.substation_id, m.state, m.start, m.end
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GridSnapshot {
        GridSnapshot {
            at: 0,
            cycles: 2,
            substations: vec![
                SubstationStatus {
                    id: "S01".into(),
                    used_mw: 30.0,
                    capacity_mw: 50.0,
                    available_mw: 20.0,
                    online: true,
                },
                SubstationStatus {
                    id: "S02".into(),
                    used_mw: 0.0,
                    capacity_mw: 40.0,
                    available_mw: 0.0,
                    online: false,
                },
            ],
            pending: vec![PendingDemand {
                consumer_id: "C101".into(),
                class: PriorityClass::Residential,
                megawatts: 25.5,
                created_at: 0,
            }],
            maintenance: vec![MaintenanceStatus {
                id: 0,
                substation_id: "S02".into(),
                start: 10,
                end: 3610,
                state: MaintenanceState::InProgress,
                known_substation: true,
            }],
            totals: Totals::default(),
        }
    }

    #[test]
    fn display_uses_status_layout() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "--- Grid Status ---");
        assert_eq!(lines[1], "Substations:");
        assert_eq!(lines[2], "  S01: 30/50 MW (ONLINE)");
        assert_eq!(lines[3], "  S02: 0/40 MW (OFFLINE)");
        assert_eq!(lines[4], "Pending Demands:");
        assert_eq!(lines[5], "  C101 (25.5MW, pr=1)");
        assert_eq!(lines[6], "Maintenance Jobs:");
        assert_eq!(lines[7], "  S02 [IN_PROGRESS] 10..3610");
    }

    #[test]
    fn offline_lists_ids() {
        assert_eq!(sample().offline(), vec!["S02"]);
    }
}
