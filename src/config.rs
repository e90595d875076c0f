//! TOML-based grid configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::grid::{DEFAULT_MAINTENANCE_SECS, GridError, Scheduler};
use crate::sim::clock::Clock;

/// Top-level grid configuration parsed from TOML.
///
/// All sections have defaults matching the `default` preset: the three
/// substations S01 (50 MW), S02 (40 MW) and S03 (60 MW). Load from TOML with
/// [`GridConfig::from_toml_file`] or use [`GridConfig::baseline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Batch simulation timing and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Substations in allocation order.
    #[serde(default = "default_substations")]
    pub substations: Vec<SubstationConfig>,
    /// Maintenance defaults and planned windows.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Synthetic demand generator parameters.
    #[serde(default)]
    pub workload: WorkloadConfig,
}

/// Batch simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Master random seed.
    pub seed: u64,
    /// Number of scheduling cycles to run (must be > 0).
    pub cycles: usize,
    /// Simulated seconds between cycles (must be > 0).
    pub cycle_interval_secs: i64,
    /// Simulated Unix time of the first cycle.
    pub start_time: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            cycles: 24,
            cycle_interval_secs: 900,
            start_time: 1_700_000_000,
        }
    }
}

/// One substation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubstationConfig {
    /// Unique identifier.
    pub id: String,
    /// Capacity (MW, must be > 0).
    pub capacity_mw: f64,
}

impl SubstationConfig {
    pub fn new(id: &str, capacity_mw: f64) -> Self {
        Self {
            id: id.to_string(),
            capacity_mw,
        }
    }
}

fn default_substations() -> Vec<SubstationConfig> {
    vec![
        SubstationConfig::new("S01", 50.0),
        SubstationConfig::new("S02", 40.0),
        SubstationConfig::new("S03", 60.0),
    ]
}

/// Maintenance defaults and planned windows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaintenanceConfig {
    /// Window length used when a caller gives only a delay (seconds).
    pub default_duration_secs: i64,
    /// Windows planned ahead of a batch run.
    pub windows: Vec<MaintenanceWindowConfig>,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_MAINTENANCE_SECS,
            windows: Vec::new(),
        }
    }
}

/// A planned maintenance window, relative to `simulation.start_time`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaintenanceWindowConfig {
    /// Target substation.
    pub substation_id: String,
    /// Seconds after `simulation.start_time` the window opens.
    pub start_offset_secs: i64,
    /// Window length (seconds, >= 0).
    pub duration_secs: i64,
}

/// Inclusive power range for generated requests.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MwRange {
    pub min: f64,
    pub max: f64,
}

impl MwRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Synthetic demand generator parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Requests generated before each cycle.
    pub requests_per_cycle: usize,
    /// Relative weight of residential requests.
    pub residential_weight: f64,
    /// Relative weight of commercial requests.
    pub commercial_weight: f64,
    /// Relative weight of industrial requests.
    pub industrial_weight: f64,
    /// Residential request size (MW).
    pub residential_mw: MwRange,
    /// Commercial request size (MW).
    pub commercial_mw: MwRange,
    /// Industrial request size (MW).
    pub industrial_mw: MwRange,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            requests_per_cycle: 3,
            residential_weight: 0.6,
            commercial_weight: 0.3,
            industrial_weight: 0.1,
            residential_mw: MwRange::new(0.5, 3.0),
            commercial_mw: MwRange::new(2.0, 6.0),
            industrial_mw: MwRange::new(5.0, 15.0),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"substations[1].capacity_mw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl GridConfig {
    /// Returns the default grid: S01/S02/S03 with light mixed demand.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            substations: default_substations(),
            maintenance: MaintenanceConfig::default(),
            workload: WorkloadConfig::default(),
        }
    }

    /// Returns the outage preset: overlapping planned maintenance on S02 and
    /// S03 during the first half of the run.
    pub fn outage() -> Self {
        Self {
            maintenance: MaintenanceConfig {
                windows: vec![
                    MaintenanceWindowConfig {
                        substation_id: "S02".to_string(),
                        start_offset_secs: 3_600,
                        duration_secs: 4 * 3_600,
                    },
                    MaintenanceWindowConfig {
                        substation_id: "S03".to_string(),
                        start_offset_secs: 2 * 3_600,
                        duration_secs: 3 * 3_600,
                    },
                    MaintenanceWindowConfig {
                        substation_id: "S02".to_string(),
                        start_offset_secs: 4 * 3_600,
                        duration_secs: 2 * 3_600,
                    },
                ],
                ..MaintenanceConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the peak preset: industrial-heavy demand that saturates the
    /// grid within a few cycles.
    pub fn peak() -> Self {
        Self {
            simulation: SimulationConfig {
                cycles: 12,
                ..SimulationConfig::default()
            },
            workload: WorkloadConfig {
                requests_per_cycle: 6,
                residential_weight: 0.3,
                commercial_weight: 0.3,
                industrial_weight: 0.4,
                industrial_mw: MwRange::new(10.0, 30.0),
                ..WorkloadConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "outage", "peak"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::baseline()),
            "outage" => Ok(Self::outage()),
            "peak" => Ok(Self::peak()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.cycles == 0 {
            errors.push(ConfigError::new("simulation.cycles", "must be > 0"));
        }
        if s.cycle_interval_secs <= 0 {
            errors.push(ConfigError::new(
                "simulation.cycle_interval_secs",
                "must be > 0",
            ));
        }

        if self.substations.is_empty() {
            errors.push(ConfigError::new("substations", "at least one substation is required"));
        }
        let mut seen = HashSet::new();
        for (i, sub) in self.substations.iter().enumerate() {
            if sub.id.trim().is_empty() {
                errors.push(ConfigError::new(format!("substations[{i}].id"), "must not be empty"));
            } else if !seen.insert(sub.id.as_str()) {
                errors.push(ConfigError::new(
                    format!("substations[{i}].id"),
                    format!("duplicate id \"{}\"", sub.id),
                ));
            }
            if !sub.capacity_mw.is_finite() || sub.capacity_mw <= 0.0 {
                errors.push(ConfigError::new(
                    format!("substations[{i}].capacity_mw"),
                    "must be finite and > 0",
                ));
            }
        }

        let m = &self.maintenance;
        if m.default_duration_secs <= 0 {
            errors.push(ConfigError::new(
                "maintenance.default_duration_secs",
                "must be > 0",
            ));
        }
        for (i, w) in m.windows.iter().enumerate() {
            if !seen.contains(w.substation_id.as_str()) {
                errors.push(ConfigError::new(
                    format!("maintenance.windows[{i}].substation_id"),
                    format!("unknown substation \"{}\"", w.substation_id),
                ));
            }
            if w.duration_secs < 0 {
                errors.push(ConfigError::new(
                    format!("maintenance.windows[{i}].duration_secs"),
                    "must be >= 0",
                ));
            }
        }

        let w = &self.workload;
        let weights = [
            ("workload.residential_weight", w.residential_weight),
            ("workload.commercial_weight", w.commercial_weight),
            ("workload.industrial_weight", w.industrial_weight),
        ];
        for (field, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                errors.push(ConfigError::new(field, "must be finite and >= 0"));
            }
        }
        if weights.iter().map(|(_, v)| v).sum::<f64>() <= 0.0 {
            errors.push(ConfigError::new(
                "workload.residential_weight",
                "class weights must sum to > 0",
            ));
        }
        for (field, range) in [
            ("workload.residential_mw", w.residential_mw),
            ("workload.commercial_mw", w.commercial_mw),
            ("workload.industrial_mw", w.industrial_mw),
        ] {
            if !range.min.is_finite() || range.min <= 0.0 {
                errors.push(ConfigError::new(format!("{field}.min"), "must be finite and > 0"));
            }
            if !range.max.is_finite() || range.min > range.max {
                errors.push(ConfigError::new(
                    format!("{field}.max"),
                    format!("must be finite and >= {field}.min"),
                ));
            }
        }

        errors
    }

    /// Builds a scheduler with every configured substation registered.
    ///
    /// # Errors
    ///
    /// Returns the first `GridError` hit while registering substations; a
    /// validated config never produces one.
    pub fn build_scheduler<C: Clock>(&self, clock: C) -> Result<Scheduler<C>, GridError> {
        let mut scheduler = Scheduler::new(clock);
        for sub in &self.substations {
            scheduler.add_substation(sub.id.clone(), sub.capacity_mw)?;
        }
        Ok(scheduler)
    }
}
