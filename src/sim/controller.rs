//! Release policies deciding how production, storage and demand are balanced.

use crate::config::ConfigError;
use crate::devices::Battery;

use super::types::Dispatch;

/// A per-timestep dispatch policy.
///
/// Implementations may only change the battery through
/// [`Battery::charge`] and [`Battery::discharge`] and must not fail on
/// numeric edge cases: clamps show up as curtailment or unmet demand.
pub trait Controller {
    /// Splits `produced_kwh` and `demand_kwh` between grid, battery and losses.
    fn dispatch(&self, produced_kwh: f32, demand_kwh: f32, battery: &mut Battery) -> Dispatch;

    /// Short policy name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Rejects inputs no policy can act on.
///
/// # Errors
///
/// Returns a `ConfigError` if `produced_kwh` or `demand_kwh` is negative or
/// not finite.
pub fn validate_inputs(t: usize, produced_kwh: f32, demand_kwh: f32) -> Result<(), ConfigError> {
    if !(produced_kwh.is_finite() && produced_kwh >= 0.0) {
        return Err(ConfigError::new(
            "signal.solar",
            format!("produced energy at step {t} is {produced_kwh}, must be >= 0"),
        ));
    }
    if !(demand_kwh.is_finite() && demand_kwh >= 0.0) {
        return Err(ConfigError::new(
            "signal.demand",
            format!("demand at step {t} is {demand_kwh}, must be >= 0"),
        ));
    }
    Ok(())
}

/// Greedy direct-then-storage FCR policy.
///
/// Production first covers demand directly. Any surplus charges the battery
/// and what does not fit is curtailed; any deficit is discharged from the
/// battery above its reserve and what remains is unmet.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyController;

impl Controller for GreedyController {
    fn dispatch(&self, produced_kwh: f32, demand_kwh: f32, battery: &mut Battery) -> Dispatch {
        let surplus_kwh = (produced_kwh - demand_kwh).max(0.0);
        let deficit_kwh = (demand_kwh - produced_kwh).max(0.0);
        let direct_kwh = produced_kwh.min(demand_kwh);

        let mut dispatch = Dispatch {
            direct_kwh,
            ..Dispatch::default()
        };

        if surplus_kwh > 0.0 {
            dispatch.charged_kwh = battery.charge(surplus_kwh);
            dispatch.curtailed_kwh = (surplus_kwh - dispatch.charged_kwh).max(0.0);
        }

        if deficit_kwh > 0.0 {
            dispatch.discharged_kwh = battery.discharge(deficit_kwh);
            dispatch.unmet_kwh = (deficit_kwh - dispatch.discharged_kwh).max(0.0);
        }

        dispatch
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Store-first policy: all production goes through the battery.
///
/// Everything produced is offered to the battery (the overflow is
/// curtailed), then demand is served from storage above the reserve. Nothing
/// is released directly, so every released kWh pays both efficiency losses.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoreFirstController;

impl Controller for StoreFirstController {
    fn dispatch(&self, produced_kwh: f32, demand_kwh: f32, battery: &mut Battery) -> Dispatch {
        let charged_kwh = battery.charge(produced_kwh);
        let curtailed_kwh = (produced_kwh - charged_kwh).max(0.0);
        let discharged_kwh = battery.discharge(demand_kwh);
        let unmet_kwh = (demand_kwh - discharged_kwh).max(0.0);

        Dispatch {
            direct_kwh: 0.0,
            charged_kwh,
            discharged_kwh,
            curtailed_kwh,
            unmet_kwh,
        }
    }

    fn name(&self) -> &'static str {
        "store_first"
    }
}

/// Controller selected at runtime.
///
/// Erases the `Controller` generic via enum dispatch for the CLI, API and TUI.
#[derive(Debug, Clone, Copy)]
pub enum Policy {
    /// [`GreedyController`].
    Greedy(GreedyController),
    /// [`StoreFirstController`].
    StoreFirst(StoreFirstController),
}

impl Policy {
    /// Available policy names.
    pub const NAMES: &[&str] = &["greedy", "store_first"];

    /// Looks up a policy by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "greedy" => Some(Self::Greedy(GreedyController)),
            "store_first" => Some(Self::StoreFirst(StoreFirstController)),
            _ => None,
        }
    }
}

impl Controller for Policy {
    fn dispatch(&self, produced_kwh: f32, demand_kwh: f32, battery: &mut Battery) -> Dispatch {
        match self {
            Self::Greedy(c) => c.dispatch(produced_kwh, demand_kwh, battery),
            Self::StoreFirst(c) => c.dispatch(produced_kwh, demand_kwh, battery),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Greedy(c) => c.name(),
            Self::StoreFirst(c) => c.name(),
        }
    }
}
