use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HrTraceError, ParseError};
use crate::import::ImportManager;
use crate::models::Series;

/// One entry of a workout manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub date: String,
    /// Path of the workout file, relative to the manifest
    pub file: String,
}

impl CatalogEntry {
    pub fn display_name(&self) -> String {
        format!("{} \u{2014} {}", self.name, self.date)
    }
}

/// List of available workouts loaded from a `manifest.json`
#[derive(Debug, Clone)]
pub struct WorkoutCatalog {
    base_dir: PathBuf,
    entries: Vec<CatalogEntry>,
}

impl WorkoutCatalog {
    /// Parse manifest content; files resolve relative to `base_dir`
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ParseError> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(content).map_err(|err| ParseError::InvalidJson {
                reason: format!("invalid workout manifest: {}", err),
            })?;

        Ok(Self {
            base_dir: base_dir.into(),
            entries,
        })
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self, HrTraceError> {
        let content = fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let catalog = Self::parse(&content, base_dir)?;
        tracing::info!(
            manifest = %path.display(),
            workouts = catalog.entries.len(),
            "loaded workout catalog"
        );
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of an entry's workout file
    pub fn resolve(&self, entry: &CatalogEntry) -> PathBuf {
        self.base_dir.join(&entry.file)
    }

    /// Load the series behind an entry
    pub fn load_series(
        &self,
        entry: &CatalogEntry,
        manager: &ImportManager,
    ) -> Result<Series, HrTraceError> {
        manager.import_file(&self.resolve(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[
        {"name": "Zach", "date": "2024-03-01", "file": "zach-interval.json"},
        {"name": "Zach", "date": "2024-03-05", "file": "nested/zach-long.tcx"}
    ]"#;

    #[test]
    fn test_parse_manifest() {
        let catalog = WorkoutCatalog::parse(MANIFEST, "/data/workouts").unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].display_name(), "Zach \u{2014} 2024-03-01");
        assert_eq!(
            catalog.resolve(&catalog.entries()[1]),
            PathBuf::from("/data/workouts/nested/zach-long.tcx")
        );
    }

    #[test]
    fn test_invalid_manifest() {
        let result = WorkoutCatalog::parse("{\"name\": 1}", ".");
        assert!(matches!(result, Err(ParseError::InvalidJson { .. })));
    }
}
