//! CSV export for simulation timestep records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::TimestepRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "timestep,time_hr,solar_intensity,produced_kwh,demand_kwh,\
                       direct_kwh,charged_kwh,discharged_kwh,released_kwh,\
                       curtailed_kwh,unmet_kwh,storage_loss_kwh,stored_kwh,soc";

/// Exports simulation records to a CSV file at the given path.
///
/// Writes a header row followed by one data row per timestep. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[TimestepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes simulation records as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[TimestepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.timestep.to_string(),
            format!("{:.2}", r.time_hr),
            format!("{:.4}", r.solar_intensity),
            format!("{:.4}", r.produced_kwh),
            format!("{:.4}", r.demand_kwh),
            format!("{:.4}", r.direct_kwh),
            format!("{:.4}", r.charged_kwh),
            format!("{:.4}", r.discharged_kwh),
            format!("{:.4}", r.released_kwh),
            format!("{:.4}", r.curtailed_kwh),
            format!("{:.4}", r.unmet_kwh),
            format!("{:.4}", r.storage_loss_kwh),
            format!("{:.4}", r.stored_after_kwh),
            format!("{:.4}", r.soc),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
