//! Physical components: storage and generation.

/// Battery energy storage model.
pub mod battery;
/// Solar panel array.
pub mod solar;

pub use battery::{Battery, BatteryState};
pub use solar::SolarPanel;
