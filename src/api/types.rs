//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::devices::BatteryState;
use crate::sim::kpi::KpiReport;
use crate::sim::types::{SimConfig, TimestepRecord};

/// Combined state response: config, KPIs, final battery and latest record.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// Simulation timing.
    pub config: SimConfig,
    /// Dispatch policy name.
    pub controller: String,
    /// Aggregate KPI report.
    pub kpi: KpiReport,
    /// Battery state after the last timestep.
    pub final_battery: BatteryState,
    /// Record of the last timestep, `null` for an empty run.
    pub latest_step: Option<TimestepRecord>,
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start timestep (inclusive).
    pub from: Option<usize>,
    /// End timestep (inclusive).
    pub to: Option<usize>,
}

impl TelemetryQuery {
    /// Resolves the query into an inclusive range.
    ///
    /// Returns `None` when `from > to`.
    pub fn range(&self) -> Option<(usize, usize)> {
        let from = self.from.unwrap_or(0);
        let to = self.to.unwrap_or(usize::MAX);
        (from <= to).then_some((from, to))
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_query_covers_everything() {
        let q = TelemetryQuery {
            from: None,
            to: None,
        };
        assert_eq!(q.range(), Some((0, usize::MAX)));
    }

    #[test]
    fn inverted_query_has_no_range() {
        let q = TelemetryQuery {
            from: Some(10),
            to: Some(5),
        };
        assert_eq!(q.range(), None);
    }
}
