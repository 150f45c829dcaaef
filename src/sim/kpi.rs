//! Post-hoc KPI computation from simulation records.

use std::fmt;

use serde::Serialize;

use super::types::TimestepRecord;

/// Aggregate key performance indicators derived from a complete simulation run.
///
/// Computed post-hoc from the record log so the report can never disagree
/// with the per-step data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KpiReport {
    /// Total solar production (kWh).
    pub produced_kwh: f32,
    /// Total grid demand (kWh).
    pub demand_kwh: f32,
    /// Total energy released to the grid (kWh).
    pub released_kwh: f32,
    /// Production released directly without storage (kWh).
    pub direct_kwh: f32,
    /// Energy drawn into the battery (kWh).
    pub charged_kwh: f32,
    /// Energy delivered by the battery (kWh).
    pub discharged_kwh: f32,
    /// Surplus production discarded (kWh).
    pub curtailed_kwh: f32,
    /// Demand left unserved (kWh).
    pub unmet_kwh: f32,
    /// Energy dissipated by charging and discharging (kWh).
    pub storage_loss_kwh: f32,
    /// Share of demand covered by released energy (%).
    pub self_sufficiency_pct: f32,
    /// Number of timesteps with unmet demand.
    pub shortfall_steps: usize,
    /// Lowest state of charge reached (0.0 to 1.0).
    pub min_soc: f32,
    /// Highest state of charge reached (0.0 to 1.0).
    pub max_soc: f32,
    /// Battery equivalent full cycles (throughput / 2*capacity).
    pub battery_equivalent_full_cycles: f32,
}

impl KpiReport {
    /// Computes all KPIs from the complete record log.
    ///
    /// # Arguments
    ///
    /// * `records` - Complete simulation records
    /// * `battery_capacity_kwh` - Battery capacity for cycle calculation
    pub fn from_records(records: &[TimestepRecord], battery_capacity_kwh: f32) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut kpi = Self {
            min_soc: f32::INFINITY,
            max_soc: f32::NEG_INFINITY,
            ..Self::default()
        };

        for r in records {
            kpi.produced_kwh += r.produced_kwh;
            kpi.demand_kwh += r.demand_kwh;
            kpi.released_kwh += r.released_kwh;
            kpi.direct_kwh += r.direct_kwh;
            kpi.charged_kwh += r.charged_kwh;
            kpi.discharged_kwh += r.discharged_kwh;
            kpi.curtailed_kwh += r.curtailed_kwh;
            kpi.unmet_kwh += r.unmet_kwh;
            kpi.storage_loss_kwh += r.storage_loss_kwh;

            if r.unmet_kwh > 0.0 {
                kpi.shortfall_steps += 1;
            }

            kpi.min_soc = kpi.min_soc.min(r.soc);
            kpi.max_soc = kpi.max_soc.max(r.soc);
        }

        kpi.self_sufficiency_pct = if kpi.demand_kwh > 0.0 {
            100.0 * kpi.released_kwh / kpi.demand_kwh
        } else {
            100.0
        };

        kpi.battery_equivalent_full_cycles = if battery_capacity_kwh > 0.0 {
            (kpi.charged_kwh + kpi.discharged_kwh) / (2.0 * battery_capacity_kwh)
        } else {
            0.0
        };

        kpi
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Produced:              {:.2} kWh", self.produced_kwh)?;
        writeln!(f, "Demand:                {:.2} kWh", self.demand_kwh)?;
        writeln!(
            f,
            "Released:              {:.2} kWh (direct {:.2}, battery {:.2})",
            self.released_kwh, self.direct_kwh, self.discharged_kwh
        )?;
        writeln!(f, "Charged:               {:.2} kWh", self.charged_kwh)?;
        writeln!(f, "Curtailed:             {:.2} kWh", self.curtailed_kwh)?;
        writeln!(
            f,
            "Unmet demand:          {:.2} kWh ({} steps)",
            self.unmet_kwh, self.shortfall_steps
        )?;
        writeln!(f, "Storage losses:        {:.2} kWh", self.storage_loss_kwh)?;
        writeln!(f, "Self-sufficiency:      {:.1}%", self.self_sufficiency_pct)?;
        writeln!(
            f,
            "SoC range:             {:.1}% .. {:.1}%",
            self.min_soc * 100.0,
            self.max_soc * 100.0
        )?;
        write!(
            f,
            "Battery cycles:        {:.2} equiv. full cycles",
            self.battery_equivalent_full_cycles
        )
    }
}
