use std::f32::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Sample, SignalSource};
use crate::config::ConfigError;

/// Returns the hour of day (0.0 to 24.0) at the start of timestep `t`.
pub fn hour_of_day(t: usize, dt_hours: f32) -> f32 {
    (t as f32 * dt_hours).rem_euclid(24.0)
}

/// Circular distance between two hours of day.
fn hour_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs().rem_euclid(24.0);
    d.min(24.0 - d)
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// Draws nothing from `rng` when `std_dev <= 0`, so noiseless curves never
/// advance the generator.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}

/// Clear-sky solar intensity shaped as a half-cosine around a peak hour.
///
/// Intensity is `amplitude` at `peak_hour`, falls to zero `half_width_hours`
/// before and after, and stays zero outside that window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarCurve {
    /// Hour of day with maximum intensity.
    pub peak_hour: f32,
    /// Hours from the peak to sunrise (and to sunset).
    pub half_width_hours: f32,
    /// Intensity at the peak (0.0 to 1.0).
    pub amplitude: f32,
    /// Relative standard deviation of multiplicative cloud noise.
    pub noise_std: f32,
}

impl SolarCurve {
    /// Creates a solar curve.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the peak hour is outside `[0, 24)`, the
    /// half-width is not in `(0, 12]`, the amplitude is outside `[0, 1]` or
    /// the noise is negative.
    pub fn new(
        peak_hour: f32,
        half_width_hours: f32,
        amplitude: f32,
        noise_std: f32,
    ) -> Result<Self, ConfigError> {
        if !(0.0..24.0).contains(&peak_hour) {
            return Err(ConfigError::new("solar.peak_hour", "must be in [0, 24)"));
        }
        if !(half_width_hours > 0.0 && half_width_hours <= 12.0) {
            return Err(ConfigError::new(
                "solar.half_width_hours",
                "must be in (0, 12]",
            ));
        }
        if !(0.0..=1.0).contains(&amplitude) {
            return Err(ConfigError::new("solar.amplitude", "must be in [0.0, 1.0]"));
        }
        if !(noise_std.is_finite() && noise_std >= 0.0) {
            return Err(ConfigError::new("solar.noise_std", "must be finite and >= 0"));
        }
        Ok(Self {
            peak_hour,
            half_width_hours,
            amplitude,
            noise_std,
        })
    }

    /// Noise-free intensity at the given hour of day.
    pub fn clear_sky(&self, hour: f32) -> f32 {
        let d = hour_distance(hour, self.peak_hour);
        if d >= self.half_width_hours {
            return 0.0;
        }
        let frac = (PI / 2.0 * d / self.half_width_hours).cos();
        (self.amplitude * frac).clamp(0.0, 1.0)
    }
}

/// Daily demand profile: a cosine around a base load peaking at `peak_hour`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandCurve {
    /// Mean demand (kW).
    pub base_kw: f32,
    /// Daily swing around the mean (kW).
    pub amp_kw: f32,
    /// Hour of day with maximum demand.
    pub peak_hour: f32,
    /// Standard deviation of additive Gaussian noise (kW).
    pub noise_std: f32,
}

impl DemandCurve {
    /// Creates a demand curve.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for negative base, amplitude or noise, or a
    /// peak hour outside `[0, 24)`.
    pub fn new(
        base_kw: f32,
        amp_kw: f32,
        peak_hour: f32,
        noise_std: f32,
    ) -> Result<Self, ConfigError> {
        if !(base_kw.is_finite() && base_kw >= 0.0) {
            return Err(ConfigError::new("demand.base_kw", "must be >= 0"));
        }
        if !(amp_kw.is_finite() && amp_kw >= 0.0) {
            return Err(ConfigError::new("demand.amp_kw", "must be >= 0"));
        }
        if !(0.0..24.0).contains(&peak_hour) {
            return Err(ConfigError::new("demand.peak_hour", "must be in [0, 24)"));
        }
        if !(noise_std.is_finite() && noise_std >= 0.0) {
            return Err(ConfigError::new("demand.noise_std", "must be finite and >= 0"));
        }
        Ok(Self {
            base_kw,
            amp_kw,
            peak_hour,
            noise_std,
        })
    }

    /// Constant demand with no daily swing and no noise.
    pub fn flat(kw: f32) -> Result<Self, ConfigError> {
        Self::new(kw, 0.0, 0.0, 0.0)
    }

    /// Noise-free demand at the given hour of day, never negative.
    pub fn mean_kw(&self, hour: f32) -> f32 {
        let angle = 2.0 * PI * (hour - self.peak_hour) / 24.0;
        (self.base_kw + self.amp_kw * angle.cos()).max(0.0)
    }
}

/// Signal generated from a solar curve and a demand curve.
///
/// Noise comes from a `StdRng` seeded anew on every pass, so repeated passes
/// and repeated runs yield identical samples.
#[derive(Debug, Clone)]
pub struct SyntheticSignal {
    solar: SolarCurve,
    demand: DemandCurve,
    steps: usize,
    dt_hours: f32,
    seed: u64,
}

impl SyntheticSignal {
    /// Creates a synthetic signal of `steps` samples spaced `dt_hours` apart.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `steps` is zero or `dt_hours` is not a
    /// positive finite number.
    pub fn new(
        solar: SolarCurve,
        demand: DemandCurve,
        steps: usize,
        dt_hours: f32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::new("simulation.steps", "must be > 0"));
        }
        if !(dt_hours.is_finite() && dt_hours > 0.0) {
            return Err(ConfigError::new("simulation.dt_hours", "must be > 0"));
        }
        Ok(Self {
            solar,
            demand,
            steps,
            dt_hours,
            seed,
        })
    }

    /// The solar curve driving this signal.
    pub fn solar(&self) -> &SolarCurve {
        &self.solar
    }

    /// The demand curve driving this signal.
    pub fn demand(&self) -> &DemandCurve {
        &self.demand
    }
}

impl SignalSource for SyntheticSignal {
    fn len(&self) -> usize {
        self.steps
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Box::new((0..self.steps).map(move |t| {
            let hour = hour_of_day(t, self.dt_hours);

            let clear = self.solar.clear_sky(hour);
            let solar_intensity = if clear > 0.0 {
                let cloud = 1.0 + gaussian_noise(&mut rng, self.solar.noise_std);
                (clear * cloud).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let demand_kw = (self.demand.mean_kw(hour)
                + gaussian_noise(&mut rng, self.demand.noise_std))
            .max(0.0);

            Sample {
                solar_intensity,
                demand_kw,
            }
        }))
    }
}
