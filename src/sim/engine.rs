//! Simulation loop that wires signal, panel, controller and battery together.

use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::devices::{Battery, SolarPanel};
use crate::signal::{Sample, SignalSource};

use super::clock::Clock;
use super::controller::{Controller, validate_inputs};
use super::types::{SimConfig, SimulationOutput, TimestepRecord};

/// Simulation engine owning the battery, the controller and the output log.
///
/// Generic over `C: Controller` for static dispatch. The battery lives inside
/// the engine, so independent engines never share state.
pub struct Engine<C: Controller> {
    config: SimConfig,
    samples: Vec<Sample>,
    panel: SolarPanel,
    battery: Battery,
    controller: C,
    clock: Clock,
    records: Vec<TimestepRecord>,
}

impl<C: Controller> Engine<C> {
    /// Creates a new simulation engine.
    ///
    /// Pulls `config.total_steps()` samples from `signal` and validates every
    /// one of them up front, so a bad input aborts before any timestep runs.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation timing
    /// * `signal` - Source of solar intensity and demand
    /// * `panel` - Solar panel array converting intensity into energy
    /// * `battery` - Battery storage, in its initial state
    /// * `controller` - Dispatch policy
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the signal is too short or yields a
    /// negative production or demand.
    pub fn new(
        config: SimConfig,
        signal: &impl SignalSource,
        panel: SolarPanel,
        battery: Battery,
        controller: C,
    ) -> Result<Self, ConfigError> {
        let total = config.total_steps();
        if signal.len() < total {
            return Err(ConfigError::new(
                "signal",
                format!(
                    "yields {} samples but simulation.steps is {total}",
                    signal.len()
                ),
            ));
        }

        let samples: Vec<Sample> = signal.samples().take(total).collect();
        for (t, s) in samples.iter().enumerate() {
            validate_inputs(
                t,
                panel.produced_kwh(s.solar_intensity, config.dt_hours),
                s.demand_kw * config.dt_hours,
            )?;
        }

        Ok(Self {
            clock: Clock::new(total),
            records: Vec::with_capacity(total),
            config,
            samples,
            panel,
            battery,
            controller,
        })
    }

    /// Executes the next timestep and returns its record.
    ///
    /// Returns `None` once every timestep has run.
    pub fn step(&mut self) -> Option<TimestepRecord> {
        let t = self.clock.tick()?;
        let sample = self.samples[t];
        let dt = self.config.dt_hours;

        let produced_kwh = self.panel.produced_kwh(sample.solar_intensity, dt);
        let demand_kwh = sample.demand_kw * dt;

        let stored_before_kwh = self.battery.stored_kwh();
        let dispatch = self
            .controller
            .dispatch(produced_kwh, demand_kwh, &mut self.battery);
        let stored_after_kwh = self.battery.stored_kwh();

        // What went in minus what came out minus what stayed is dissipation.
        let storage_loss_kwh = (dispatch.charged_kwh
            - dispatch.discharged_kwh
            - (stored_after_kwh - stored_before_kwh))
            .max(0.0);

        let record = TimestepRecord {
            timestep: t,
            time_hr: t as f32 * dt,
            solar_intensity: sample.solar_intensity,
            produced_kwh,
            demand_kwh,
            direct_kwh: dispatch.direct_kwh,
            charged_kwh: dispatch.charged_kwh,
            discharged_kwh: dispatch.discharged_kwh,
            released_kwh: dispatch.released_kwh(),
            curtailed_kwh: dispatch.curtailed_kwh,
            unmet_kwh: dispatch.unmet_kwh,
            storage_loss_kwh,
            stored_before_kwh,
            stored_after_kwh,
            soc: self.battery.soc(),
        };

        debug!(
            t,
            produced_kwh,
            demand_kwh,
            released_kwh = record.released_kwh,
            stored_kwh = stored_after_kwh,
            "step"
        );

        self.records.push(record.clone());
        Some(record)
    }

    /// Executes all remaining timesteps and returns the complete log.
    pub fn run(&mut self) -> SimulationOutput {
        info!(
            steps = self.clock.remaining(),
            dt_hours = self.config.dt_hours,
            controller = self.controller.name(),
            "starting simulation"
        );

        while self.step().is_some() {}

        let curtailed: f32 = self.records.iter().map(|r| r.curtailed_kwh).sum();
        let unmet: f32 = self.records.iter().map(|r| r.unmet_kwh).sum();
        if curtailed > 0.0 {
            warn!(curtailed_kwh = curtailed, "surplus production was curtailed");
        }
        if unmet > 0.0 {
            warn!(unmet_kwh = unmet, "demand was left unmet");
        }
        info!(
            stored_kwh = self.battery.stored_kwh(),
            "simulation finished"
        );

        SimulationOutput {
            records: self.records.clone(),
            final_battery: self.battery.state(),
        }
    }

    /// Records of the timesteps executed so far.
    pub fn records(&self) -> &[TimestepRecord] {
        &self.records
    }

    /// Returns `true` when every timestep has run.
    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    /// Returns a reference to the battery.
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the dispatch policy.
    pub fn controller(&self) -> &C {
        &self.controller
    }
}
