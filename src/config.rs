//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::devices::{Battery, SolarPanel};
use crate::signal::{DemandCurve, SeriesSignal, Signal, SolarCurve, SyntheticSignal};
use crate::sim::controller::Policy;
use crate::sim::engine::Engine;
use crate::sim::types::SimConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Solar panel array parameters.
    #[serde(default)]
    pub panel: PanelConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Synthetic solar curve parameters.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Synthetic demand curve parameters.
    #[serde(default)]
    pub demand: DemandConfig,
    /// External series replacing the synthetic curves when present.
    #[serde(default)]
    pub series: Option<SeriesConfig>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of timesteps (must be > 0).
    pub steps: usize,
    /// Timestep length in hours (must be > 0).
    pub dt_hours: f32,
    /// Seed for synthetic noise.
    pub seed: u64,
    /// Controller type: `"greedy"` or `"store_first"`.
    pub controller: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 24,
            dt_hours: 1.0,
            seed: 42,
            controller: "greedy".to_string(),
        }
    }
}

/// Solar panel array parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Rated output at intensity 1.0 (kW).
    pub capacity_kw: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { capacity_kw: 100.0 }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total energy capacity (kWh).
    pub capacity_kwh: f32,
    /// Energy that is never discharged (kWh).
    pub min_reserve_kwh: f32,
    /// Stored energy at the start of the run (kWh).
    pub initial_kwh: f32,
    /// Charge efficiency (0.0–1.0].
    pub eta_charge: f32,
    /// Discharge efficiency (0.0–1.0].
    pub eta_discharge: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 200.0,
            min_reserve_kwh: 20.0,
            initial_kwh: 20.0,
            eta_charge: 0.95,
            eta_discharge: 0.95,
        }
    }
}

/// Synthetic solar curve parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Hour of day with maximum intensity.
    pub peak_hour: f32,
    /// Hours from peak to sunrise and to sunset.
    pub half_width_hours: f32,
    /// Intensity at the peak (0.0–1.0).
    pub amplitude: f32,
    /// Relative cloud noise standard deviation.
    pub noise_std: f32,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            peak_hour: 12.0,
            half_width_hours: 7.0,
            amplitude: 1.0,
            noise_std: 0.0,
        }
    }
}

/// Synthetic demand curve parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Mean demand (kW).
    pub base_kw: f32,
    /// Daily swing around the mean (kW).
    pub amp_kw: f32,
    /// Hour of day with maximum demand.
    pub peak_hour: f32,
    /// Gaussian noise standard deviation (kW).
    pub noise_std: f32,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            base_kw: 50.0,
            amp_kw: 0.0,
            peak_hour: 18.0,
            noise_std: 0.0,
        }
    }
}

/// Paths to JSON profiles replayed instead of the synthetic curves.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesConfig {
    /// File holding `{"sunlight_intensity": [...]}`.
    pub solar_path: PathBuf,
    /// File holding `{"grid_demand": [...]}` in kW.
    pub demand_path: PathBuf,
}

impl SeriesConfig {
    /// Joins relative profile paths onto `base`. Absolute and empty paths are
    /// left as they are.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.solar_path, &mut self.demand_path] {
            if !path.as_os_str().is_empty() && path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.min_reserve_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    /// Creates an error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: noon-peaking sun on a 100 kW array,
    /// flat 50 kW demand and a 200 kWh battery starting at its reserve.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the lossless preset: baseline with perfect efficiencies.
    pub fn lossless() -> Self {
        Self {
            battery: BatteryConfig {
                eta_charge: 1.0,
                eta_discharge: 1.0,
                ..BatteryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the undersized preset: a small battery that both curtails
    /// at midday and runs dry at night.
    pub fn undersized() -> Self {
        Self {
            battery: BatteryConfig {
                capacity_kwh: 60.0,
                min_reserve_kwh: 6.0,
                initial_kwh: 6.0,
                eta_charge: 0.9,
                eta_discharge: 0.9,
            },
            ..Self::default()
        }
    }

    /// Returns the cloudy preset: weaker, noisy sun and an evening demand peak.
    pub fn cloudy() -> Self {
        Self {
            solar: SolarConfig {
                amplitude: 0.7,
                noise_std: 0.25,
                ..SolarConfig::default()
            },
            demand: DemandConfig {
                base_kw: 45.0,
                amp_kw: 15.0,
                noise_std: 3.0,
                ..DemandConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the store-first preset: baseline routed entirely through storage.
    pub fn store_first() -> Self {
        Self {
            simulation: SimulationConfig {
                controller: "store_first".to_string(),
                ..SimulationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "baseline",
        "lossless",
        "undersized",
        "cloudy",
        "store_first",
    ];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "lossless" => Ok(Self::lossless()),
            "undersized" => Ok(Self::undersized()),
            "cloudy" => Ok(Self::cloudy()),
            "store_first" => Ok(Self::store_first()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// Relative `[series]` paths are resolved against the directory holding
    /// the scenario file, so the scenario loads from any working directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let (Some(series), Some(base)) = (cfg.series.as_mut(), path.parent()) {
            series.resolve_relative_to(base);
        }
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Series files are
    /// not read here; [`ScenarioConfig::build_engine`] reports their errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if let Err(e) = SimConfig::new(s.steps, s.dt_hours) {
            errors.push(e);
        }
        if Policy::from_name(&s.controller).is_none() {
            errors.push(ConfigError::new(
                "simulation.controller",
                format!(
                    "must be one of {}, got \"{}\"",
                    Policy::NAMES.join(", "),
                    s.controller
                ),
            ));
        }
        if let Err(e) = SolarPanel::new(self.panel.capacity_kw) {
            errors.push(e);
        }
        if let Err(e) = self.build_battery() {
            errors.push(e);
        }

        match &self.series {
            Some(series) => {
                if series.solar_path.as_os_str().is_empty() {
                    errors.push(ConfigError::new("series.solar_path", "must not be empty"));
                }
                if series.demand_path.as_os_str().is_empty() {
                    errors.push(ConfigError::new("series.demand_path", "must not be empty"));
                }
            }
            None => {
                if let Err(e) = self.solar_curve() {
                    errors.push(e);
                }
                if let Err(e) = self.demand_curve() {
                    errors.push(e);
                }
            }
        }

        errors
    }

    /// Builds a ready-to-run engine from this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found: an invalid field, an unreadable
    /// or malformed series file, or a signal shorter than `simulation.steps`.
    pub fn build_engine(&self) -> Result<Engine<Policy>, ConfigError> {
        if let Some(e) = self.validate().into_iter().next() {
            return Err(e);
        }
        let sim = SimConfig::new(self.simulation.steps, self.simulation.dt_hours)?;
        let controller = Policy::from_name(&self.simulation.controller).ok_or_else(|| {
            ConfigError::new("simulation.controller", "unknown controller")
        })?;
        let signal = self.signal()?;
        Engine::new(
            sim,
            &signal,
            SolarPanel::new(self.panel.capacity_kw)?,
            self.build_battery()?,
            controller,
        )
    }

    /// Builds the input signal: series files when configured, otherwise the
    /// synthetic curves.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the curves are invalid or the files cannot
    /// be loaded.
    pub fn signal(&self) -> Result<Signal, ConfigError> {
        match &self.series {
            Some(series) => Ok(Signal::Series(SeriesSignal::from_json_files(
                &series.solar_path,
                &series.demand_path,
            )?)),
            None => Ok(Signal::Synthetic(SyntheticSignal::new(
                self.solar_curve()?,
                self.demand_curve()?,
                self.simulation.steps,
                self.simulation.dt_hours,
                self.simulation.seed,
            )?)),
        }
    }

    fn build_battery(&self) -> Result<Battery, ConfigError> {
        let b = &self.battery;
        Battery::new(
            b.capacity_kwh,
            b.min_reserve_kwh,
            b.initial_kwh,
            b.eta_charge,
            b.eta_discharge,
        )
    }

    fn solar_curve(&self) -> Result<SolarCurve, ConfigError> {
        let s = &self.solar;
        SolarCurve::new(s.peak_hour, s.half_width_hours, s.amplitude, s.noise_std)
    }

    fn demand_curve(&self) -> Result<DemandCurve, ConfigError> {
        let d = &self.demand;
        DemandCurve::new(d.base_kw, d.amp_kw, d.peak_hour, d.noise_std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
steps = 48
dt_hours = 0.5
seed = 7
controller = "store_first"

[panel]
capacity_kw = 80.0

[battery]
capacity_kwh = 150.0
min_reserve_kwh = 15.0
initial_kwh = 30.0
eta_charge = 0.9
eta_discharge = 0.92

[solar]
peak_hour = 13.0
half_width_hours = 6.0
amplitude = 0.8
noise_std = 0.1

[demand]
base_kw = 40.0
amp_kw = 10.0
peak_hour = 19.0
noise_std = 2.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.steps), Some(48));
        assert_eq!(cfg.as_ref().map(|c| c.battery.eta_discharge), Some(0.92));
        assert_eq!(
            cfg.as_ref().map(|c| &*c.simulation.controller),
            Some("store_first")
        );
        assert!(cfg.as_ref().is_some_and(|c| c.validate().is_empty()));
    }

    #[test]
    fn series_section_parses() {
        let toml = r#"
[series]
solar_path = "data/sunlight_profile.json"
demand_path = "data/grid_demand_profile.json"
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).expect("valid TOML");
        let series = cfg.series.expect("series section present");
        assert_eq!(series.solar_path, PathBuf::from("data/sunlight_profile.json"));
    }

    #[test]
    fn series_paths_join_scenario_directory() {
        let mut series = SeriesConfig {
            solar_path: PathBuf::from("../data/sun.json"),
            demand_path: PathBuf::from("/srv/profiles/demand.json"),
        };
        series.resolve_relative_to(Path::new("/opt/sim/scenarios"));
        assert_eq!(
            series.solar_path,
            PathBuf::from("/opt/sim/scenarios/../data/sun.json")
        );
        assert_eq!(series.demand_path, PathBuf::from("/srv/profiles/demand.json"));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
capacity_kwh = 100.0
max_charge_kw = 5.0
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "toml");
    }

    #[test]
    fn validation_catches_zero_steps() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.steps"));
    }

    #[test]
    fn validation_catches_reserve_above_capacity() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.min_reserve_kwh = 250.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.min_reserve_kwh"));
    }

    #[test]
    fn validation_catches_bad_efficiency() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.eta_charge = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.eta_charge"));
    }

    #[test]
    fn validation_catches_negative_amplitude() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.solar.amplitude = -0.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "solar.amplitude"));
    }

    #[test]
    fn validation_blames_infinite_noise_on_its_field() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.solar.noise_std = f32::INFINITY;
        cfg.demand.noise_std = f32::NAN;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"solar.noise_std".to_string()), "{fields:?}");
        assert!(fields.contains(&"demand.noise_std".to_string()), "{fields:?}");
        let err = cfg.build_engine().err().expect("infinite noise rejected");
        assert_eq!(err.field, "solar.noise_std");
    }

    #[test]
    fn validation_catches_bad_controller() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.controller = "bogus".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.controller"));
    }

    #[test]
    fn validation_collects_several_errors() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps = 0;
        cfg.panel.capacity_kw = -1.0;
        cfg.demand.base_kw = -5.0;
        let errors = cfg.validate();
        assert!(errors.len() >= 3, "expected three errors: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn unknown_preset_rejected() {
        let err = ScenarioConfig::from_preset("sunny").unwrap_err();
        assert_eq!(err.field, "preset");
        assert!(err.message.contains("baseline"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // seed overridden
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        // steps kept default
        assert_eq!(cfg.as_ref().map(|c| c.simulation.steps), Some(24));
        assert_eq!(cfg.as_ref().map(|c| c.panel.capacity_kw), Some(100.0));
        assert!(cfg.as_ref().is_some_and(|c| c.series.is_none()));
    }

    #[test]
    fn build_engine_rejects_invalid_config() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.initial_kwh = 500.0;
        let err = cfg.build_engine().err().expect("invalid config");
        assert_eq!(err.field, "battery.initial_kwh");
    }

    #[test]
    fn build_engine_reports_missing_series_file() {
        let cfg = ScenarioConfig {
            series: Some(SeriesConfig {
                solar_path: PathBuf::from("does/not/exist.json"),
                demand_path: PathBuf::from("does/not/exist.json"),
            }),
            ..ScenarioConfig::baseline()
        };
        let err = cfg.build_engine().err().expect("missing file");
        assert_eq!(err.field, "series.solar_path");
    }

    #[test]
    fn build_engine_runs_requested_steps() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps = 12;
        let mut engine = cfg.build_engine().expect("valid config");
        assert_eq!(engine.run().records.len(), 12);
    }

    #[test]
    fn error_display_names_field() {
        let e = ConfigError::new("battery.eta_charge", "must be in (0.0, 1.0]");
        assert_eq!(
            e.to_string(),
            "config error: battery.eta_charge: must be in (0.0, 1.0]"
        );
    }
}
