use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{Sample, SignalSource};
use crate::config::ConfigError;

/// Solar profile file layout: `{"sunlight_intensity": [0.0, 0.1, ...]}`.
#[derive(Debug, Deserialize)]
struct SunlightProfile {
    sunlight_intensity: Vec<f32>,
}

/// Demand profile file layout: `{"grid_demand": [50.0, 48.5, ...]}`.
#[derive(Debug, Deserialize)]
struct GridDemandProfile {
    grid_demand: Vec<f32>,
}

/// Signal replayed from externally supplied series.
///
/// A pass yields one sample per index up to the shorter of the two series.
#[derive(Debug, Clone)]
pub struct SeriesSignal {
    solar_intensity: Vec<f32>,
    demand_kw: Vec<f32>,
}

impl SeriesSignal {
    /// Creates a signal from solar intensity ratios and demand in kW.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if any intensity is outside `[0, 1]` or any
    /// demand value is negative or not finite.
    pub fn new(solar_intensity: Vec<f32>, demand_kw: Vec<f32>) -> Result<Self, ConfigError> {
        if let Some(i) = solar_intensity
            .iter()
            .position(|v| !(0.0..=1.0).contains(v))
        {
            return Err(ConfigError::new(
                "series.solar",
                format!(
                    "intensity at index {i} is {}, must be in [0.0, 1.0]",
                    solar_intensity[i]
                ),
            ));
        }
        if let Some(i) = demand_kw
            .iter()
            .position(|v| !(v.is_finite() && *v >= 0.0))
        {
            return Err(ConfigError::new(
                "series.demand",
                format!("demand at index {i} is {}, must be >= 0", demand_kw[i]),
            ));
        }
        Ok(Self {
            solar_intensity,
            demand_kw,
        })
    }

    /// Parses the two JSON profile documents.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if either document is malformed or holds
    /// out-of-range values.
    pub fn from_json_strs(solar_json: &str, demand_json: &str) -> Result<Self, ConfigError> {
        let solar: SunlightProfile = parse_json(solar_json, "series.solar_path")?;
        let demand: GridDemandProfile = parse_json(demand_json, "series.demand_path")?;
        Self::new(solar.sunlight_intensity, demand.grid_demand)
    }

    /// Loads the two JSON profile files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a file cannot be read or parsed.
    pub fn from_json_files(solar_path: &Path, demand_path: &Path) -> Result<Self, ConfigError> {
        let solar_json = read_file(solar_path, "series.solar_path")?;
        let demand_json = read_file(demand_path, "series.demand_path")?;
        Self::from_json_strs(&solar_json, &demand_json)
    }
}

fn read_file(path: &Path, field: &str) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| {
        ConfigError::new(field, format!("cannot read \"{}\": {e}", path.display()))
    })
}

fn parse_json<T: DeserializeOwned>(s: &str, field: &str) -> Result<T, ConfigError> {
    serde_json::from_str(s).map_err(|e| ConfigError::new(field, e.to_string()))
}

impl SignalSource for SeriesSignal {
    fn len(&self) -> usize {
        self.solar_intensity.len().min(self.demand_kw.len())
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        Box::new(
            self.solar_intensity
                .iter()
                .zip(&self.demand_kw)
                .map(|(&solar_intensity, &demand_kw)| Sample {
                    solar_intensity,
                    demand_kw,
                }),
        )
    }
}
