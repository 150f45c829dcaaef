//! Human-readable run reports on stdout.

use std::io::{self, Write};

use crate::sim::kpi::KpiReport;
use crate::sim::types::TimestepRecord;

/// Writes one line per timestep (unless `quiet`) followed by the KPI report.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_report(
    records: &[TimestepRecord],
    kpi: &KpiReport,
    quiet: bool,
    mut out: impl Write,
) -> io::Result<()> {
    if !quiet {
        for r in records {
            writeln!(out, "{r}")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{kpi}")?;
    out.flush()
}

/// Prints the report to stdout.
///
/// # Errors
///
/// Returns an `io::Error` if stdout is closed.
pub fn print_report(records: &[TimestepRecord], kpi: &KpiReport, quiet: bool) -> io::Result<()> {
    write_report(records, kpi, quiet, io::stdout().lock())
}
