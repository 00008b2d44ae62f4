use std::io::Write;

use crate::error::ExportError;
use crate::models::Series;
use crate::resample::{format_time, TimeGrid};

/// Write the series resampled onto the chart grid.
///
/// Columns: `time_seconds,label,heart_rate`. Grid points past the end of the
/// workout have an empty heart rate.
pub fn write_resampled<W: Write>(
    writer: W,
    series: &Series,
    grid: &TimeGrid,
) -> Result<(), ExportError> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    csv_writer.write_record(["time_seconds", "label", "heart_rate"])?;

    for (time, value) in grid.times().zip(grid.resample(series)) {
        csv_writer.write_record([
            time.to_string(),
            format_time(time),
            value.map(|hr| hr.to_string()).unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the raw samples
pub fn write_samples<W: Write>(writer: W, series: &Series) -> Result<(), ExportError> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    csv_writer.write_record(["elapsed_seconds", "heart_rate"])?;
    for sample in series.samples() {
        csv_writer.serialize((sample.elapsed_seconds, sample.heart_rate))?;
    }
    csv_writer.flush()?;
    Ok(())
}
