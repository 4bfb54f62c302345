//! CSV export of assembly outcomes.
//!
//! One row per accepted descriptor and one per warning, so a scenario run
//! can be diffed against a previous one without parsing the text report.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::pipeline::Assembly;

/// Column header for the outcome table.
const HEADER: &str = "dynamic_id,library,equipment_id,status,detail";

/// Exports an assembly outcome table to a CSV file at the given path.
///
/// Writes a header row, one row per accepted model and event (status is the
/// stage name), then one row per warning (status is the warning kind).
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(assembly: &Assembly, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(assembly, buf)
}

/// Writes an assembly outcome table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(assembly: &Assembly, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(HEADER.split(','))?;

    // Accepted descriptors, stage by stage
    for stage in &assembly.stages {
        for model in &stage.models {
            wtr.write_record(&[
                model.dynamic_id.as_str(),
                model.library.as_str(),
                model.equipment_id.as_deref().unwrap_or(""),
                stage.name,
                "",
            ])?;
        }
        for event in &stage.events {
            wtr.write_record(&[
                event.dynamic_id.as_str(),
                event.library.as_str(),
                event.equipment_id.as_str(),
                stage.name,
                "",
            ])?;
        }
    }

    // Rejections and downgrades
    for warning in assembly.report.warnings() {
        wtr.write_record(&[
            warning.id.as_str(),
            warning.library.as_str(),
            "",
            warning.kind.label(),
            warning.detail.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
