//! CSV export for simulation records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::runner::CycleRecord;

/// Column header for the per-cycle telemetry export.
const CYCLE_HEADER: &str = "cycle,time,submitted,allocated,allocated_mw,shed,shed_mw,\
                            pending,offline_substations,peak_utilization";

/// Column header for the per-request outcome export.
const OUTCOME_HEADER: &str = "cycle,consumer_id,class,megawatts,created_at,state,substation";

/// Exports one row per cycle to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_cycles_csv(records: &[CycleRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_cycles_csv(records, io::BufWriter::new(file))
}

/// Writes one row per cycle as CSV to any writer.
///
/// Offline substations are joined with `;` in a single column.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_cycles_csv(records: &[CycleRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(CYCLE_HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.cycle.to_string(),
            r.at.to_string(),
            r.submitted.to_string(),
            r.allocated.to_string(),
            format!("{:.4}", r.allocated_mw),
            r.shed.to_string(),
            format!("{:.4}", r.shed_mw),
            r.pending.to_string(),
            r.offline_substations.join(";"),
            format!("{:.4}", r.peak_utilization),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports every terminal request to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_outcomes_csv(records: &[CycleRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_outcomes_csv(records, io::BufWriter::new(file))
}

/// Writes one row per attempted request, in cycle then attempt order.
///
/// The `substation` column is empty for shed requests.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_outcomes_csv(records: &[CycleRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(OUTCOME_HEADER.split(','))?;

    for r in records {
        for o in &r.outcomes {
            let req = &o.request;
            wtr.write_record(&[
                r.cycle.to_string(),
                req.consumer_id().to_string(),
                req.class().token().to_string(),
                format!("{:.4}", req.megawatts()),
                req.created_at().to_string(),
                req.state().to_string(),
                o.substation.clone().unwrap_or_default(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
