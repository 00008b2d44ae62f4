use serde::Deserialize;
use std::path::Path;

use crate::error::ParseError;
use crate::import::ImportFormat;
use crate::models::{Sample, Series};

/// Pre-recorded workout as stored alongside the workout manifest
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordedWorkout {
    name: String,
    #[serde(default)]
    date: String,
    /// Informational only; the series duration comes from the last point
    #[serde(default)]
    total_time_seconds: Option<f64>,
    data_points: Vec<RecordedPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordedPoint {
    elapsed_seconds: f64,
    hr: u16,
}

/// Importer for the JSON workout records
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    fn parse_str(&self, content: &str) -> Result<Series, ParseError> {
        parse_recorded_workout(content)
    }

    fn get_format_name(&self) -> &'static str {
        "JSON"
    }
}

/// Parse a JSON workout record into a series
pub fn parse_recorded_workout(content: &str) -> Result<Series, ParseError> {
    let record: RecordedWorkout =
        serde_json::from_str(content).map_err(|err| ParseError::InvalidJson {
            reason: err.to_string(),
        })?;

    if record.data_points.is_empty() {
        return Err(ParseError::NoUsableSamples {
            format: "JSON".to_string(),
        });
    }

    let samples: Vec<Sample> = record
        .data_points
        .iter()
        .map(|p| Sample::new(p.elapsed_seconds, p.hr))
        .collect();

    if let Some(declared) = record.total_time_seconds {
        let last = samples[samples.len() - 1].elapsed_seconds;
        if (declared - last).abs() > f64::EPSILON {
            tracing::debug!(declared, last, "declared total time differs from last data point");
        }
    }

    tracing::info!(
        name = %record.name,
        date = %record.date,
        samples = samples.len(),
        "loaded recorded workout"
    );

    Series::new(record.name, record.date, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recorded_workout() {
        let content = r#"{
            "name": "Tempo Run",
            "date": "2024-02-14",
            "totalTimeSeconds": 20,
            "dataPoints": [
                {"elapsedSeconds": 0, "hr": 98},
                {"elapsedSeconds": 10, "hr": 120},
                {"elapsedSeconds": 20, "hr": 141}
            ]
        }"#;

        let series = parse_recorded_workout(content).unwrap();
        assert_eq!(series.name(), "Tempo Run");
        assert_eq!(series.date(), "2024-02-14");
        assert_eq!(series.sample_count(), 3);
        assert_eq!(series.total_duration_seconds(), 20.0);
    }

    #[test]
    fn test_empty_data_points() {
        let content = r#"{"name": "Empty", "date": "2024-02-14", "dataPoints": []}"#;
        let result = parse_recorded_workout(content);
        assert!(matches!(result, Err(ParseError::NoUsableSamples { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_recorded_workout("{ not json");
        assert!(matches!(result, Err(ParseError::InvalidJson { .. })));
    }

    #[test]
    fn test_out_of_order_points_are_rejected() {
        let content = r#"{"name": "X", "dataPoints": [
            {"elapsedSeconds": 10, "hr": 100},
            {"elapsedSeconds": 5, "hr": 100}
        ]}"#;
        let result = parse_recorded_workout(content);
        assert!(matches!(result, Err(ParseError::InvalidSeries { .. })));
    }
}
