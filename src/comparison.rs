use serde::Serialize;

use crate::models::{mean_heart_rate, round_half_up, Series};

/// Absolute bpm at or above which a sample counts as high intensity
pub const DEFAULT_HIGH_INTENSITY_BPM: u16 = 160;

/// Summary statistics shown in the side-by-side stat grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonStats {
    pub avg_hr: u16,
    pub max_hr: u16,
    /// Elapsed time of the first sample at max HR
    pub time_to_peak_seconds: f64,
    pub duration_seconds: f64,
    pub high_intensity_seconds: f64,
}

impl ComparisonStats {
    /// Summarize a series.
    ///
    /// High-intensity time is `count(hr >= threshold)` times the mean sample
    /// spacing (`duration / sample_count`), rounded. This is an estimate: it
    /// drifts from the true time above threshold when sampling is irregular.
    pub fn from_series(series: &Series, high_intensity_bpm: u16) -> Self {
        let samples = series.samples();

        let avg_hr = mean_heart_rate(series.heart_rates())
            .map(|avg| round_half_up(avg) as u16)
            .unwrap_or_default();

        // First occurrence wins on ties
        let peak = samples.iter().fold(series.first_sample(), |best, s| {
            if s.heart_rate > best.heart_rate {
                s
            } else {
                best
            }
        });

        let duration_seconds = series.total_duration_seconds();
        let average_interval = duration_seconds / samples.len() as f64;
        let high_count = samples
            .iter()
            .filter(|s| s.heart_rate >= high_intensity_bpm)
            .count();

        Self {
            avg_hr,
            max_hr: peak.heart_rate,
            time_to_peak_seconds: peak.elapsed_seconds,
            duration_seconds,
            high_intensity_seconds: round_half_up(high_count as f64 * average_interval),
        }
    }
}

/// Which side of a comparison has the higher value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Leader {
    First,
    Second,
    Tie,
}

impl Leader {
    fn of(first: f64, second: f64) -> Self {
        if first > second {
            Leader::First
        } else if second > first {
            Leader::Second
        } else {
            Leader::Tie
        }
    }
}

/// Per-metric higher-value flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricLeaders {
    pub avg_hr: Leader,
    pub max_hr: Leader,
    pub time_to_peak: Leader,
    pub duration: Leader,
    pub high_intensity: Leader,
}

impl MetricLeaders {
    fn between(first: &ComparisonStats, second: &ComparisonStats) -> Self {
        Self {
            avg_hr: Leader::of(f64::from(first.avg_hr), f64::from(second.avg_hr)),
            max_hr: Leader::of(f64::from(first.max_hr), f64::from(second.max_hr)),
            time_to_peak: Leader::of(first.time_to_peak_seconds, second.time_to_peak_seconds),
            duration: Leader::of(first.duration_seconds, second.duration_seconds),
            high_intensity: Leader::of(first.high_intensity_seconds, second.high_intensity_seconds),
        }
    }
}

/// Stats for one workout, or two side by side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesComparison {
    pub first_name: String,
    pub first: ComparisonStats,
    pub second_name: Option<String>,
    pub second: Option<ComparisonStats>,
    /// Present only when two series are compared
    pub leaders: Option<MetricLeaders>,
}

impl SeriesComparison {
    pub fn new(first: &Series, second: Option<&Series>, high_intensity_bpm: u16) -> Self {
        let first_stats = ComparisonStats::from_series(first, high_intensity_bpm);
        let second_stats = second.map(|s| ComparisonStats::from_series(s, high_intensity_bpm));
        let leaders = second_stats
            .as_ref()
            .map(|other| MetricLeaders::between(&first_stats, other));

        Self {
            first_name: first.name().to_string(),
            first: first_stats,
            second_name: second.map(|s| s.name().to_string()),
            second: second_stats,
            leaders,
        }
    }
}
