//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use solar_bess_sim::config::ScenarioConfig;
use solar_bess_sim::devices::BatteryState;
use solar_bess_sim::sim::types::{SimulationOutput, TimestepRecord};

/// Tolerance for energy balances that pass through an efficiency factor.
pub const EPS: f32 = 1e-3;

/// Runs a built-in preset to completion.
pub fn run_preset(name: &str) -> SimulationOutput {
    let cfg = ScenarioConfig::from_preset(name).expect("preset should exist");
    run_config(&cfg)
}

/// Runs a scenario configuration to completion.
pub fn run_config(cfg: &ScenarioConfig) -> SimulationOutput {
    let mut engine = cfg.build_engine().expect("scenario should build");
    engine.run()
}

/// Checks the per-step guarantees every run must satisfy.
///
/// - stored energy stays within `[min_reserve, capacity]`
/// - consecutive records chain their stored energy
/// - released never exceeds production plus the usable stored energy
/// - demand is split exactly into released and unmet
/// - stored energy moves by `charged * eta_c - discharged / eta_d`
pub fn assert_step_invariants(records: &[TimestepRecord], battery: &BatteryState) {
    let mut prev_after: Option<f32> = None;
    for r in records {
        let t = r.timestep;
        assert!(
            r.stored_after_kwh >= battery.min_reserve_kwh - EPS
                && r.stored_after_kwh <= battery.capacity_kwh + EPS,
            "t={t}: stored {} outside [{}, {}]",
            r.stored_after_kwh,
            battery.min_reserve_kwh,
            battery.capacity_kwh
        );
        if let Some(prev) = prev_after {
            assert_eq!(r.stored_before_kwh, prev, "t={t}: stored energy not carried");
        }
        prev_after = Some(r.stored_after_kwh);

        assert!(r.released_kwh >= 0.0, "t={t}: negative release");
        let bound = r.produced_kwh
            + (r.stored_before_kwh - battery.min_reserve_kwh) * battery.eta_discharge;
        assert!(
            r.released_kwh <= bound + EPS,
            "t={t}: released {} above bound {bound}",
            r.released_kwh
        );

        assert!(
            (r.released_kwh + r.unmet_kwh - r.demand_kwh).abs() < EPS,
            "t={t}: demand not balanced"
        );

        let expected_after = r.stored_before_kwh + r.charged_kwh * battery.eta_charge
            - r.discharged_kwh / battery.eta_discharge;
        assert!(
            (r.stored_after_kwh - expected_after).abs() < EPS,
            "t={t}: battery balance off: {} vs {expected_after}",
            r.stored_after_kwh
        );
    }
}
