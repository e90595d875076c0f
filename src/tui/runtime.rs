//! Simulation driver and TUI application state.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::warn;

use crate::config::GridConfig;
use crate::grid::{GridError, Substation, Totals};
use crate::sim::runner::{CycleRecord, Simulation};

/// Maximum number of history entries kept for the rolling chart.
const MAX_HISTORY: usize = 200;

/// Tick interval options in milliseconds (slowest → fastest).
const SPEED_LEVELS_MS: [u64; 6] = [1000, 500, 250, 100, 50, 20];

/// Default speed index (250 ms).
const DEFAULT_SPEED_IDX: usize = 2;

/// Presets bound to the number keys, in key order.
pub const PRESET_KEYS: [&str; 3] = ["default", "outage", "peak"];

/// TUI application state.
pub struct App {
    /// Running simulation.
    sim: Simulation,
    /// Rolling history of cycle records for the chart.
    pub history: VecDeque<CycleRecord>,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Current index into `SPEED_LEVELS_MS`.
    pub speed_idx: usize,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// When the last simulation tick was executed.
    pub last_tick: Instant,
    /// Name of the active preset.
    pub preset_name: String,
    /// Last error raised by the simulation; pauses the run.
    pub error: Option<String>,
}

impl App {
    /// Creates a new app from a preset name, falling back to `default`.
    ///
    /// # Errors
    ///
    /// Returns a `GridError` if the preset's grid cannot be built.
    pub fn new(preset: &str) -> Result<Self, GridError> {
        let (name, config) = match GridConfig::from_preset(preset) {
            Ok(cfg) => (preset, cfg),
            Err(e) => {
                warn!(error = %e, "falling back to default preset");
                ("default", GridConfig::baseline())
            }
        };
        Ok(Self {
            sim: Simulation::from_config(&config)?,
            history: VecDeque::with_capacity(MAX_HISTORY),
            paused: false,
            speed_idx: DEFAULT_SPEED_IDX,
            quit: false,
            last_tick: Instant::now(),
            preset_name: name.to_string(),
            error: None,
        })
    }

    /// Runs one cycle if not finished.
    pub fn tick(&mut self) {
        if self.is_finished() {
            return;
        }
        match self.sim.step() {
            Ok(record) => {
                if self.history.len() >= MAX_HISTORY {
                    self.history.pop_front();
                }
                self.history.push_back(record);
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.paused = true;
            }
        }
    }

    /// Toggles pause/resume.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Increases simulation speed (shorter tick interval).
    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_LEVELS_MS.len() {
            self.speed_idx += 1;
        }
    }

    /// Decreases simulation speed (longer tick interval).
    pub fn speed_down(&mut self) {
        if self.speed_idx > 0 {
            self.speed_idx -= 1;
        }
    }

    /// Returns the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        SPEED_LEVELS_MS[self.speed_idx]
    }

    /// Switches to a different preset, resetting simulation state.
    pub fn switch_preset(&mut self, name: &str) {
        let Ok(config) = GridConfig::from_preset(name) else {
            return;
        };
        match Simulation::from_config(&config) {
            Ok(sim) => {
                self.sim = sim;
                self.history.clear();
                self.paused = false;
                self.error = None;
                self.preset_name = name.to_string();
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Restarts the current preset from the beginning.
    pub fn restart(&mut self) {
        let name = self.preset_name.clone();
        self.switch_preset(&name);
    }

    /// Cycles run so far.
    pub fn cycle(&self) -> usize {
        self.sim.cycles_run()
    }

    /// Cycles in the configured run.
    pub fn total_cycles(&self) -> usize {
        self.sim.config().simulation.cycles
    }

    /// Returns `true` when every configured cycle has run.
    pub fn is_finished(&self) -> bool {
        self.sim.is_finished()
    }

    /// Substations in allocation order.
    pub fn substations(&self) -> &[Substation] {
        self.sim.scheduler().substations()
    }

    pub fn totals(&self) -> Totals {
        self.sim.scheduler().totals()
    }

    /// Returns the most recent cycle record, if any.
    pub fn last_record(&self) -> Option<&CycleRecord> {
        self.history.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(preset: &str) -> App {
        App::new(preset).unwrap()
    }

    #[test]
    fn app_creates_and_ticks() {
        let mut app = app("default");
        assert_eq!(app.cycle(), 0);
        assert!(!app.is_finished());

        app.tick();
        assert_eq!(app.cycle(), 1);
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn app_finishes_after_total_cycles() {
        let mut app = app("default");
        for _ in 0..app.total_cycles() {
            app.tick();
        }
        assert!(app.is_finished());
        let before = app.cycle();
        app.tick();
        assert_eq!(app.cycle(), before);
    }

    #[test]
    fn unknown_preset_falls_back() {
        let app = app("nope");
        assert_eq!(app.preset_name, "default");
    }

    #[test]
    fn speed_controls_stay_in_bounds() {
        let mut app = app("default");
        for _ in 0..10 {
            app.speed_down();
        }
        assert_eq!(app.speed_idx, 0);
        for _ in 0..10 {
            app.speed_up();
        }
        assert_eq!(app.speed_idx, SPEED_LEVELS_MS.len() - 1);
    }

    #[test]
    fn switch_preset_resets_state() {
        let mut app = app("default");
        app.tick();
        app.tick();
        app.switch_preset("outage");
        assert_eq!(app.cycle(), 0);
        assert!(app.history.is_empty());
        assert_eq!(app.preset_name, "outage");
    }

    #[test]
    fn restart_resets_state() {
        let mut app = app("peak");
        for _ in 0..5 {
            app.tick();
        }
        app.restart();
        assert_eq!(app.cycle(), 0);
        assert_eq!(app.totals(), Totals::default());
        assert_eq!(app.preset_name, "peak");
    }

    #[test]
    fn toggle_pause() {
        let mut app = app("default");
        app.toggle_pause();
        assert!(app.paused);
        app.toggle_pause();
        assert!(!app.paused);
    }
}
