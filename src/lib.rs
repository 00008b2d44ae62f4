// Library interface for hrtrace modules
// This allows integration tests and benches to access the core functionality

pub mod analysis;
pub mod comparison;
pub mod config;
pub mod drift;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod models;
pub mod peaks;
pub mod recovery;
pub mod resample;
pub mod segment;
pub mod sustained;
pub mod trimp;
pub mod zone_time;
pub mod zones;

// Re-export commonly used types for convenience
pub use analysis::{run_analysis, AnalysisKind, AnalysisOutput, WorkoutAnalysis};
pub use comparison::{ComparisonStats, Leader, SeriesComparison};
pub use config::AppConfig;
pub use drift::{CardiacDrift, DriftRating};
pub use error::{CalculationError, HrTraceError, InsufficientData, ParseError, Result};
pub use import::{ImportFormat, ImportManager, WorkoutCatalog};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::{Highlight, Insight, Interval, Sample, Series, TimeRange};
pub use peaks::{find_peak_interval, PeakIntervals};
pub use recovery::{RecoveryAnalysis, RecoveryDetector};
pub use resample::{format_time, resample_to_interval, TimeGrid};
pub use segment::SegmentStats;
pub use sustained::{SustainedEffort, SustainedEffortFinder};
pub use trimp::{TrimpCalculator, TrimpScore};
pub use zone_time::ZoneTimeBreakdown;
pub use zones::{ZoneClass, ZoneModel, HR_ZONES};
