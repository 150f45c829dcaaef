use crate::config::ConfigError;

/// A solar panel array that converts irradiance intensity into energy.
///
/// Intensity is a ratio in `[0, 1]` of the array's rated output, so a
/// 100 kW array at intensity 0.5 for one hour yields 50 kWh.
#[derive(Debug, Clone, Copy)]
pub struct SolarPanel {
    /// Rated (peak) output in kilowatts.
    pub capacity_kw: f32,
}

impl SolarPanel {
    /// Creates a panel array with the given rated output.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `capacity_kw` is negative or not finite.
    pub fn new(capacity_kw: f32) -> Result<Self, ConfigError> {
        if !(capacity_kw.is_finite() && capacity_kw >= 0.0) {
            return Err(ConfigError::new("panel.capacity_kw", "must be >= 0"));
        }
        Ok(Self { capacity_kw })
    }

    /// Energy produced over one timestep of `dt_hours` at `intensity`.
    pub fn produced_kwh(&self, intensity: f32, dt_hours: f32) -> f32 {
        intensity * self.capacity_kw * dt_hours
    }
}
