//! Core simulation types: timing, per-step records and run output.

use std::fmt;

use serde::Serialize;

use crate::config::ConfigError;
use crate::devices::BatteryState;

/// Simulation timing.
///
/// # Examples
///
/// ```
/// use solar_bess_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(24, 1.0).unwrap();
/// assert_eq!(cfg.total_steps(), 24);
/// assert_eq!(cfg.horizon_hours(), 24.0);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    /// Number of timesteps to simulate.
    pub steps: usize,
    /// Duration of one timestep in hours.
    pub dt_hours: f32,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `steps` is zero or `dt_hours` is not a
    /// positive finite number.
    pub fn new(steps: usize, dt_hours: f32) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::new("simulation.steps", "must be > 0"));
        }
        if !(dt_hours.is_finite() && dt_hours > 0.0) {
            return Err(ConfigError::new("simulation.dt_hours", "must be > 0"));
        }
        Ok(Self { steps, dt_hours })
    }

    /// Total number of simulation steps.
    pub fn total_steps(&self) -> usize {
        self.steps
    }

    /// Simulated duration in hours.
    pub fn horizon_hours(&self) -> f32 {
        self.steps as f32 * self.dt_hours
    }
}

/// Controller decision for one timestep, all values in kWh.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dispatch {
    /// Production released straight to the grid.
    pub direct_kwh: f32,
    /// Energy drawn into the battery (including charging losses).
    pub charged_kwh: f32,
    /// Energy delivered by the battery to the grid.
    pub discharged_kwh: f32,
    /// Surplus that could neither be stored nor released.
    pub curtailed_kwh: f32,
    /// Demand left uncovered.
    pub unmet_kwh: f32,
}

impl Dispatch {
    /// Total energy released to the grid.
    pub fn released_kwh(&self) -> f32 {
        self.direct_kwh + self.discharged_kwh
    }
}

/// Complete record of one simulation timestep. Energies are in kWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestepRecord {
    /// Timestep index.
    pub timestep: usize,
    /// Simulation time in hours at the start of the step.
    pub time_hr: f32,
    /// Solar intensity used for this step (0.0 to 1.0).
    pub solar_intensity: f32,
    /// Energy produced by the panels.
    pub produced_kwh: f32,
    /// Energy demanded by the grid.
    pub demand_kwh: f32,
    /// Production released directly.
    pub direct_kwh: f32,
    /// Energy drawn into the battery.
    pub charged_kwh: f32,
    /// Energy delivered by the battery.
    pub discharged_kwh: f32,
    /// Total energy released to the grid.
    pub released_kwh: f32,
    /// Surplus that was discarded.
    pub curtailed_kwh: f32,
    /// Demand that was not served.
    pub unmet_kwh: f32,
    /// Energy dissipated by charging and discharging.
    pub storage_loss_kwh: f32,
    /// Stored energy before the step.
    pub stored_before_kwh: f32,
    /// Stored energy after the step.
    pub stored_after_kwh: f32,
    /// State of charge after the step (0.0 to 1.0).
    pub soc: f32,
}

impl fmt::Display for TimestepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} ({:>5.1}h) | produced={:>7.2} kWh  demand={:>7.2} kWh | \
             stored={:>7.2} kWh ({:>5.1}%) | released={:>7.2} kWh  \
             curtailed={:.2}  unmet={:.2}",
            self.timestep,
            self.time_hr,
            self.produced_kwh,
            self.demand_kwh,
            self.stored_after_kwh,
            self.soc * 100.0,
            self.released_kwh,
            self.curtailed_kwh,
            self.unmet_kwh,
        )
    }
}

/// Final artifact of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    /// One record per timestep, in order.
    pub records: Vec<TimestepRecord>,
    /// Battery state after the last timestep.
    pub final_battery: BatteryState,
}
