use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::comparison::DEFAULT_HIGH_INTENSITY_BPM;
use crate::error::CalculationError;
use crate::logging::LogConfig;
use crate::models::Series;
use crate::resample::{TimeGrid, DEFAULT_STEP_SECONDS};
use crate::zones::{ZoneModel, DEFAULT_MAX_HR};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Heart-rate zone settings
    pub zones: ZoneSettings,

    /// Chart grid settings
    pub chart: ChartSettings,

    /// Stat-grid comparison settings
    pub comparison: ComparisonSettings,

    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    /// Maximum heart rate the zone boundaries are derived from
    pub max_hr: u16,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            max_hr: DEFAULT_MAX_HR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Spacing of the resampled chart grid
    pub resample_step_seconds: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            resample_step_seconds: DEFAULT_STEP_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    /// Absolute bpm counted as high intensity
    pub high_intensity_bpm: u16,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            high_intensity_bpm: DEFAULT_HIGH_INTENSITY_BPM,
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hrtrace")
            .join("config.toml")
    }

    /// Load the default config file, falling back to built-in defaults when
    /// it is missing or unreadable
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!(
                    "Ignoring config file {}: {:#}",
                    config_path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check every setting against the ranges the analytics accept
    pub fn validate(&self) -> Result<(), CalculationError> {
        self.zone_model()?;
        TimeGrid::new(self.chart.resample_step_seconds, 0.0)?;
        if self.comparison.high_intensity_bpm == 0 {
            return Err(CalculationError::invalid_parameter(
                "comparison",
                "high_intensity_bpm",
                self.comparison.high_intensity_bpm,
            ));
        }
        Ok(())
    }

    pub fn zone_model(&self) -> Result<ZoneModel, CalculationError> {
        ZoneModel::new(self.zones.max_hr)
    }

    /// Chart grid spanning a whole series
    pub fn time_grid_for(&self, series: &Series) -> Result<TimeGrid, CalculationError> {
        TimeGrid::for_series(series, self.chart.resample_step_seconds)
    }

    /// Look up a setting by dotted key, formatted for display
    pub fn get_value(&self, key: &str) -> Option<String> {
        let value = match key {
            "zones.max_hr" => self.zones.max_hr.to_string(),
            "chart.resample_step_seconds" => self.chart.resample_step_seconds.to_string(),
            "comparison.high_intensity_bpm" => self.comparison.high_intensity_bpm.to_string(),
            "logging.level" => self.logging.level.to_filter().to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Update a setting from a `key=value` pair
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "zones.max_hr" => {
                self.zones.max_hr = value
                    .parse()
                    .with_context(|| format!("Invalid max HR: {}", value))?
            }
            "chart.resample_step_seconds" => {
                self.chart.resample_step_seconds = value
                    .parse()
                    .with_context(|| format!("Invalid step: {}", value))?
            }
            "comparison.high_intensity_bpm" => {
                self.comparison.high_intensity_bpm = value
                    .parse()
                    .with_context(|| format!("Invalid threshold: {}", value))?
            }
            "logging.level" => {
                self.logging.level = value.parse().map_err(anyhow::Error::msg)?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
        }

        self.validate()?;
        Ok(())
    }

    /// Every settable key
    pub fn keys() -> &'static [&'static str] {
        &[
            "zones.max_hr",
            "chart.resample_step_seconds",
            "comparison.high_intensity_bpm",
            "logging.level",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
        assert_eq!(deserialized.zones.max_hr, 190);
        assert_eq!(deserialized.chart.resample_step_seconds, 30.0);
        assert_eq!(deserialized.comparison.high_intensity_bpm, 160);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("[zones]\nmax_hr = 200\n").unwrap();
        assert_eq!(config.zones.max_hr, 200);
        assert_eq!(config.chart.resample_step_seconds, 30.0);
        assert_eq!(config.zone_model().unwrap().max_hr(), 200);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.zones.max_hr = 185;
        original.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.zones.max_hr, 185);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[chart]\nresample_step_seconds = 0.0\n").unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_get_and_set_values() {
        let mut config = AppConfig::default();
        config.set_value("zones.max_hr", "180").unwrap();
        config.set_value("logging.level", "debug").unwrap();

        assert_eq!(config.get_value("zones.max_hr").as_deref(), Some("180"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.set_value("zones.max_hr", "abc").is_err());
        assert!(config.set_value("unknown.key", "1").is_err());
        assert!(config.get_value("unknown.key").is_none());

        for key in AppConfig::keys() {
            assert!(config.get_value(key).is_some());
        }
    }

    #[test]
    fn test_set_value_validates() {
        let mut config = AppConfig::default();
        assert!(config.set_value("zones.max_hr", "40").is_err());
    }

    #[test]
    fn test_time_grid_for_series() {
        use crate::models::Sample;

        let series = Series::new(
            "Run",
            "2024-01-01",
            vec![Sample::new(0.0, 100), Sample::new(95.0, 140)],
        )
        .unwrap();
        let grid = AppConfig::default().time_grid_for(&series).unwrap();
        assert_eq!(grid.len(), 4);
    }
}
