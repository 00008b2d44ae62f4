use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{span, Level};

use crate::comparison::ComparisonStats;
use crate::config::AppConfig;
use crate::drift::CardiacDrift;
use crate::error::HrTraceError;
use crate::models::{Highlight, Insight, Series, TimeRange};
use crate::peaks::PeakIntervals;
use crate::recovery::{RecoveryAnalysis, RecoveryDetector};
use crate::sustained::{SustainedEffort, SustainedEffortFinder};
use crate::trimp::{TrimpCalculator, TrimpScore};
use crate::zone_time::ZoneTimeBreakdown;

/// The analyses that can be requested by identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    ZoneTime,
    Recovery,
    PeakIntervals,
    CardiacDrift,
    SustainedEffort,
    Trimp,
    Summary,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::Summary,
        AnalysisKind::ZoneTime,
        AnalysisKind::Recovery,
        AnalysisKind::PeakIntervals,
        AnalysisKind::CardiacDrift,
        AnalysisKind::SustainedEffort,
        AnalysisKind::Trimp,
    ];

    /// Stable identifier used on the command line and in exports
    pub fn id(&self) -> &'static str {
        match self {
            AnalysisKind::ZoneTime => "zone-time",
            AnalysisKind::Recovery => "recovery",
            AnalysisKind::PeakIntervals => "peak-intervals",
            AnalysisKind::CardiacDrift => "cardiac-drift",
            AnalysisKind::SustainedEffort => "sustained-effort",
            AnalysisKind::Trimp => "trimp",
            AnalysisKind::Summary => "summary",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AnalysisKind::ZoneTime => "Time in Zones",
            AnalysisKind::Recovery => "Heart Rate Recovery",
            AnalysisKind::PeakIntervals => "Peak Intervals",
            AnalysisKind::CardiacDrift => "Cardiac Drift",
            AnalysisKind::SustainedEffort => "Longest Sustained Effort",
            AnalysisKind::Trimp => "Training Load (TRIMP)",
            AnalysisKind::Summary => "Summary",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        AnalysisKind::ALL
            .iter()
            .find(|kind| kind.id() == id)
            .copied()
            .ok_or_else(|| {
                let known: Vec<&str> = AnalysisKind::ALL.iter().map(|k| k.id()).collect();
                format!("Unknown analysis '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Result of a single analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", content = "output", rename_all = "kebab-case")]
pub enum AnalysisOutput {
    ZoneTime(ZoneTimeBreakdown),
    Recovery(Insight<RecoveryAnalysis>),
    PeakIntervals(PeakIntervals),
    CardiacDrift(Insight<CardiacDrift>),
    SustainedEffort(Insight<SustainedEffort>),
    Trimp(TrimpScore),
    Summary(ComparisonStats),
}

impl AnalysisOutput {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutput::ZoneTime(_) => AnalysisKind::ZoneTime,
            AnalysisOutput::Recovery(_) => AnalysisKind::Recovery,
            AnalysisOutput::PeakIntervals(_) => AnalysisKind::PeakIntervals,
            AnalysisOutput::CardiacDrift(_) => AnalysisKind::CardiacDrift,
            AnalysisOutput::SustainedEffort(_) => AnalysisKind::SustainedEffort,
            AnalysisOutput::Trimp(_) => AnalysisKind::Trimp,
            AnalysisOutput::Summary(_) => AnalysisKind::Summary,
        }
    }
}

impl Highlight for AnalysisOutput {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        match self {
            AnalysisOutput::ZoneTime(result) => result.highlight_ranges(),
            AnalysisOutput::Recovery(result) => result.highlight_ranges(),
            AnalysisOutput::PeakIntervals(result) => result.highlight_ranges(),
            AnalysisOutput::CardiacDrift(result) => result.highlight_ranges(),
            AnalysisOutput::SustainedEffort(result) => result.highlight_ranges(),
            AnalysisOutput::Trimp(result) => result.highlight_ranges(),
            AnalysisOutput::Summary(_) => Vec::new(),
        }
    }
}

/// Run one analysis over a series
pub fn run_analysis(
    kind: AnalysisKind,
    series: &Series,
    config: &AppConfig,
) -> Result<AnalysisOutput, HrTraceError> {
    let span = span!(Level::DEBUG, "analysis", kind = %kind, series = %series.name());
    let _guard = span.enter();

    let zones = config.zone_model()?;

    let output = match kind {
        AnalysisKind::ZoneTime => {
            AnalysisOutput::ZoneTime(ZoneTimeBreakdown::calculate(series, &zones))
        }
        AnalysisKind::Recovery => AnalysisOutput::Recovery(RecoveryDetector::new(zones).analyze(series)),
        AnalysisKind::PeakIntervals => AnalysisOutput::PeakIntervals(PeakIntervals::find(series)),
        AnalysisKind::CardiacDrift => AnalysisOutput::CardiacDrift(CardiacDrift::calculate(series)),
        AnalysisKind::SustainedEffort => {
            AnalysisOutput::SustainedEffort(SustainedEffortFinder::new(zones).find(series))
        }
        AnalysisKind::Trimp => AnalysisOutput::Trimp(TrimpCalculator::new(zones).calculate(series)),
        AnalysisKind::Summary => AnalysisOutput::Summary(ComparisonStats::from_series(
            series,
            config.comparison.high_intensity_bpm,
        )),
    };

    tracing::debug!(samples = series.sample_count(), "analysis finished");
    Ok(output)
}

/// Every analysis for one workout, as exported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutAnalysis {
    pub name: String,
    pub date: String,
    pub sample_count: usize,
    pub max_hr_setting: u16,
    pub summary: ComparisonStats,
    pub zone_time: ZoneTimeBreakdown,
    pub recovery: Insight<RecoveryAnalysis>,
    pub peak_intervals: PeakIntervals,
    pub cardiac_drift: Insight<CardiacDrift>,
    pub sustained_effort: Insight<SustainedEffort>,
    pub trimp: TrimpScore,
}

impl WorkoutAnalysis {
    pub fn analyze(series: &Series, config: &AppConfig) -> Result<Self, HrTraceError> {
        let zones = config.zone_model()?;

        let analysis = Self {
            name: series.name().to_string(),
            date: series.date().to_string(),
            sample_count: series.sample_count(),
            max_hr_setting: zones.max_hr(),
            summary: ComparisonStats::from_series(series, config.comparison.high_intensity_bpm),
            zone_time: ZoneTimeBreakdown::calculate(series, &zones),
            recovery: RecoveryDetector::new(zones).analyze(series),
            peak_intervals: PeakIntervals::find(series),
            cardiac_drift: CardiacDrift::calculate(series),
            sustained_effort: SustainedEffortFinder::new(zones).find(series),
            trimp: TrimpCalculator::new(zones).calculate(series),
        };

        tracing::info!(
            workout = %analysis.name,
            trimp = analysis.trimp.score,
            "workout analyzed"
        );

        Ok(analysis)
    }

    /// The stored result for one analysis kind
    pub fn output(&self, kind: AnalysisKind) -> AnalysisOutput {
        match kind {
            AnalysisKind::ZoneTime => AnalysisOutput::ZoneTime(self.zone_time.clone()),
            AnalysisKind::Recovery => AnalysisOutput::Recovery(self.recovery.clone()),
            AnalysisKind::PeakIntervals => AnalysisOutput::PeakIntervals(self.peak_intervals.clone()),
            AnalysisKind::CardiacDrift => AnalysisOutput::CardiacDrift(self.cardiac_drift.clone()),
            AnalysisKind::SustainedEffort => {
                AnalysisOutput::SustainedEffort(self.sustained_effort.clone())
            }
            AnalysisKind::Trimp => AnalysisOutput::Trimp(self.trimp.clone()),
            AnalysisKind::Summary => AnalysisOutput::Summary(self.summary),
        }
    }
}
