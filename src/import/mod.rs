use std::fs;
use std::path::Path;

use crate::error::{HrTraceError, ParseError};
use crate::models::Series;

pub mod json;
pub mod manifest;
pub mod tcx;

pub use manifest::{CatalogEntry, WorkoutCatalog};

/// Trait for turning workout content of one file format into a `Series`
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Parse already-loaded content
    fn parse_str(&self, content: &str) -> Result<Series, ParseError>;

    /// Read and parse a file
    fn import_file(&self, file_path: &Path) -> Result<Series, HrTraceError> {
        let content = fs::read_to_string(file_path)?;
        Ok(self.parse_str(&content)?)
    }

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Manager for coordinating the different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![
            Box::new(tcx::TcxImporter::new()),
            Box::new(json::JsonImporter::new()),
        ];

        Self { importers }
    }

    /// Import a single file, picking the importer by extension
    pub fn import_file(&self, file_path: &Path) -> Result<Series, HrTraceError> {
        let importer = self.importer_for(file_path)?;
        tracing::debug!(
            file = %file_path.display(),
            format = importer.get_format_name(),
            "importing workout file"
        );
        importer.import_file(file_path)
    }

    /// Parse uploaded content that has no trustworthy file name.
    ///
    /// JSON records start with `{`; anything else is treated as TCX.
    pub fn parse_content(&self, content: &str) -> Result<Series, ParseError> {
        let format = if content.trim_start().starts_with('{') {
            "JSON"
        } else {
            "TCX"
        };

        self.importers
            .iter()
            .find(|importer| importer.get_format_name() == format)
            .ok_or_else(|| ParseError::UnsupportedFormat {
                format: format.to_string(),
            })?
            .parse_str(content)
    }

    /// Validate a file without keeping the series
    pub fn validate_file(&self, file_path: &Path) -> Result<usize, HrTraceError> {
        let series = self.import_file(file_path)?;
        Ok(series.sample_count())
    }

    /// Check if this manager can import a given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }

    fn importer_for(&self, file_path: &Path) -> Result<&dyn ImportFormat, ParseError> {
        self.importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .map(|importer| importer.as_ref())
            .ok_or_else(|| ParseError::UnsupportedFormat {
                format: file_path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}
