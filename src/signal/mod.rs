//! Input signals: solar intensity and grid demand per timestep.
//!
//! A [`SignalSource`] yields one [`Sample`] per timestep. Two sources exist:
//! [`SyntheticSignal`] generates diurnal curves, [`SeriesSignal`] replays
//! externally supplied series. [`Signal`] erases the two for callers that
//! pick the source at runtime.

/// Diurnal curve generators.
pub mod curve;
/// Externally supplied series.
pub mod series;

pub use curve::{DemandCurve, SolarCurve, SyntheticSignal};
pub use series::SeriesSignal;

/// Solar and demand inputs for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Solar intensity as a fraction of rated panel output (0.0 to 1.0).
    pub solar_intensity: f32,
    /// Grid demand (kW, >= 0).
    pub demand_kw: f32,
}

/// A finite, restartable source of per-timestep samples.
///
/// Every call to [`SignalSource::samples`] starts a fresh pass that yields
/// the same values in the same order.
pub trait SignalSource {
    /// Number of samples one pass yields.
    fn len(&self) -> usize;

    /// Returns `true` if the source yields nothing.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a new pass over the samples.
    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_>;
}

/// Signal source selected at runtime.
///
/// Enum dispatch keeps the engine generic parameter concrete for the CLI.
#[derive(Debug, Clone)]
pub enum Signal {
    /// Generated from diurnal curves.
    Synthetic(SyntheticSignal),
    /// Replayed from external series.
    Series(SeriesSignal),
}

impl SignalSource for Signal {
    fn len(&self) -> usize {
        match self {
            Self::Synthetic(s) => s.len(),
            Self::Series(s) => s.len(),
        }
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        match self {
            Self::Synthetic(s) => s.samples(),
            Self::Series(s) => s.samples(),
        }
    }
}
