use std::io::Write;

use crate::analysis::WorkoutAnalysis;
use crate::error::ExportError;

/// Write the full workout analysis as pretty JSON
pub fn write_analysis<W: Write>(writer: W, analysis: &WorkoutAnalysis) -> Result<(), ExportError> {
    write_json(writer, analysis)
}

/// Write any serializable value as pretty JSON followed by a newline
pub fn write_json<T, W>(mut writer: W, data: &T) -> Result<(), ExportError>
where
    T: serde::Serialize + ?Sized,
    W: Write,
{
    serde_json::to_writer_pretty(&mut writer, data)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::{Sample, Series};

    #[test]
    fn test_write_analysis() {
        let samples = (0..=80).map(|k| Sample::new((k * 10) as f64, 130)).collect();
        let series = Series::new("Tempo", "2024-07-07", samples).unwrap();
        let analysis = WorkoutAnalysis::analyze(&series, &AppConfig::default()).unwrap();

        let mut buffer = Vec::new();
        write_analysis(&mut buffer, &analysis).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["name"], "Tempo");
        assert_eq!(value["date"], "2024-07-07");
        assert_eq!(value["cardiac_drift"]["status"], "available");
        assert_eq!(value["cardiac_drift"]["result"]["rating"], "Excellent");
        assert_eq!(value["recovery"]["status"], "not_applicable");
        assert_eq!(value["summary"]["max_hr"], 130);
    }

    #[test]
    fn test_write_json_slice() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &[1, 2, 3][..]).unwrap();
        assert!(String::from_utf8(buffer).unwrap().ends_with("]\n"));
    }
}
