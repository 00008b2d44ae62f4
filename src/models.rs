use serde::{Deserialize, Serialize};

use crate::error::{InsufficientData, ParseError};

/// A single heart-rate reading in a workout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the first recorded timestamp of the workout
    pub elapsed_seconds: f64,

    /// Heart rate in beats per minute
    pub heart_rate: u16,
}

impl Sample {
    pub fn new(elapsed_seconds: f64, heart_rate: u16) -> Self {
        Self {
            elapsed_seconds,
            heart_rate,
        }
    }
}

/// Normalized heart-rate time series for one workout.
///
/// Samples are ordered by non-decreasing elapsed time and there is always at
/// least one. A series is never mutated once built; every derived structure
/// is recomputed from it on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    name: String,
    date: String,
    samples: Vec<Sample>,
}

impl Series {
    /// Build a series, checking the ordering and value invariants
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        samples: Vec<Sample>,
    ) -> Result<Self, ParseError> {
        if samples.is_empty() {
            return Err(ParseError::InvalidSeries {
                reason: "series must contain at least one sample".to_string(),
            });
        }

        let mut previous = 0.0_f64;
        for (index, sample) in samples.iter().enumerate() {
            if !sample.elapsed_seconds.is_finite() || sample.elapsed_seconds < 0.0 {
                return Err(ParseError::InvalidSeries {
                    reason: format!(
                        "sample {} has invalid elapsed time {}",
                        index, sample.elapsed_seconds
                    ),
                });
            }
            if sample.heart_rate == 0 {
                return Err(ParseError::InvalidSeries {
                    reason: format!("sample {} has zero heart rate", index),
                });
            }
            if index > 0 && sample.elapsed_seconds < previous {
                return Err(ParseError::InvalidSeries {
                    reason: format!(
                        "sample {} goes back in time ({}s after {}s)",
                        index, sample.elapsed_seconds, previous
                    ),
                });
            }
            previous = sample.elapsed_seconds;
        }

        Ok(Self {
            name: name.into(),
            date: date.into(),
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calendar day of the workout (YYYY-MM-DD when parsed from a file)
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Elapsed time of the last sample
    pub fn total_duration_seconds(&self) -> f64 {
        self.last_sample().elapsed_seconds
    }

    pub fn first_sample(&self) -> &Sample {
        // Non-empty by construction
        &self.samples[0]
    }

    pub fn last_sample(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn heart_rates(&self) -> impl Iterator<Item = u16> + '_ {
        self.samples.iter().map(|s| s.heart_rate)
    }

    /// Consecutive (earlier, later) sample pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&Sample, &Sample)> + '_ {
        self.samples.windows(2).map(|w| (&w[0], &w[1]))
    }
}

/// A span of workout time, used to drive chart highlight overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TimeRange {
    pub fn new(start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// A window of the series found by a window-search algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start_time: f64,
    pub end_time: f64,
    pub average_hr: u16,
    pub max_hr: u16,
}

impl Interval {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// Outcome of an analysis whose preconditions may not hold for a workout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Insight<T> {
    Available(T),
    NotApplicable(InsufficientData),
}

impl<T> Insight<T> {
    pub fn not_applicable(calculation: &str, reason: impl Into<String>) -> Self {
        let gap = InsufficientData::new(calculation, reason);
        tracing::debug!(calculation = %gap.calculation, reason = %gap.reason, "analysis not applicable");
        Insight::NotApplicable(gap)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Insight::Available(_))
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Insight::Available(value) => Some(value),
            Insight::NotApplicable(_) => None,
        }
    }

    pub fn into_available(self) -> Option<T> {
        match self {
            Insight::Available(value) => Some(value),
            Insight::NotApplicable(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Insight<U> {
        match self {
            Insight::Available(value) => Insight::Available(f(value)),
            Insight::NotApplicable(gap) => Insight::NotApplicable(gap),
        }
    }
}

/// Time ranges a result wants highlighted on a heart-rate chart
pub trait Highlight {
    fn highlight_ranges(&self) -> Vec<TimeRange>;
}

impl<T: Highlight> Highlight for Insight<T> {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        self.as_available()
            .map(Highlight::highlight_ranges)
            .unwrap_or_default()
    }
}

impl Highlight for Interval {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        vec![self.range()]
    }
}

/// Round half up (towards positive infinity): `-2.5` becomes `-2`, `2.5`
/// becomes `3`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Arithmetic mean of heart rates; `None` for an empty input
pub fn mean_heart_rate<I: IntoIterator<Item = u16>>(rates: I) -> Option<f64> {
    let (sum, count) = rates
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), hr| (sum + u64::from(hr), count + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
