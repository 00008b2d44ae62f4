use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::analysis::WorkoutAnalysis;
use crate::error::ExportError;
use crate::models::Series;
use crate::resample::TimeGrid;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    /// Usual file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }

    /// Guess the format from an output path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Everything an export writer may need for one workout
pub struct ExportBundle<'a> {
    pub series: &'a Series,
    pub grid: &'a TimeGrid,
    pub analysis: &'a WorkoutAnalysis,
}

/// Write a workout in the requested format
pub fn write_export<W: Write>(
    writer: W,
    format: ExportFormat,
    bundle: &ExportBundle<'_>,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => json::write_analysis(writer, bundle.analysis),
        ExportFormat::Csv => csv::write_resampled(writer, bundle.series, bundle.grid),
        ExportFormat::Text => text::write_report(writer, bundle.analysis),
    }
}

/// Write a workout export to a file, creating parent directories
pub fn export_to_file<P: AsRef<Path>>(
    output_path: P,
    format: ExportFormat,
    bundle: &ExportBundle<'_>,
) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path).map_err(|err| ExportError::Failed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let mut writer = BufWriter::new(file);
    write_export(&mut writer, format, bundle)?;
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        format = format.extension(),
        workout = %bundle.series.name(),
        "export written"
    );
    Ok(())
}
