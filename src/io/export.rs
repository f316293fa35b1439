//! CSV export of baseline vs adjusted comparison rows.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::artifact::TIMESTAMP_WRITE_FORMAT;
use crate::series::LoadSeries;

/// Column header for the comparison CSV.
const HEADER: &str = "timestamp,baseline_kw,adjusted_kw,delta_kw";

/// Exports a baseline/adjusted comparison to a CSV file at the given path.
///
/// Writes a header row followed by one data row per sample. Produces
/// deterministic output for identical inputs. The two series are expected to
/// share their timestamp sequence (the scenario engine guarantees this);
/// rows are paired positionally.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(baseline: &LoadSeries, adjusted: &LoadSeries, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(baseline, adjusted, buf)
}

/// Writes a baseline/adjusted comparison as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(
    baseline: &LoadSeries,
    adjusted: &LoadSeries,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for (b, a) in baseline.iter().zip(adjusted.iter()) {
        wtr.write_record(&[
            b.timestamp.format(TIMESTAMP_WRITE_FORMAT).to_string(),
            format!("{:.4}", b.demand_kw),
            format!("{:.4}", a.demand_kw),
            format!("{:.4}", a.demand_kw - b.demand_kw),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
