//! Uniform time-grid resampling for charting and cross-series comparison
//!
//! Workouts are recorded at irregular intervals. Charts (and side-by-side
//! comparisons) want one value per fixed step, so the series is linearly
//! interpolated onto a grid starting at 0 seconds.

use serde::Serialize;

use crate::error::CalculationError;
use crate::models::{round_half_up, Series, TimeRange};

/// Default chart grid step in seconds
pub const DEFAULT_STEP_SECONDS: f64 = 30.0;

/// Resample a series onto `0, step, 2*step, ... <= max_time`.
///
/// Each grid point is linearly interpolated between the two surrounding
/// samples. Points before the first sample or after the last one are `None`;
/// once the segment pointer has run out of segments the last sample's value is
/// repeated.
pub fn resample_to_interval(
    series: &Series,
    step_seconds: f64,
    max_time: f64,
) -> Result<Vec<Option<u16>>, CalculationError> {
    validate_grid(step_seconds, max_time)?;

    let samples = series.samples();
    let last_index = samples.len() - 1;
    let first_time = samples[0].elapsed_seconds;
    let last_time = samples[last_index].elapsed_seconds;
    let point_count = grid_len(step_seconds, max_time);

    let mut result = Vec::with_capacity(point_count);
    let mut index = 0;

    for step in 0..point_count {
        let t = step as f64 * step_seconds;

        // The pointer only ever moves forward as t increases
        while index < last_index && samples[index + 1].elapsed_seconds <= t {
            index += 1;
        }

        if t < first_time || t > last_time {
            result.push(None);
        } else if index >= last_index {
            result.push(Some(samples[index].heart_rate));
        } else {
            let p1 = &samples[index];
            let p2 = &samples[index + 1];
            let span = p2.elapsed_seconds - p1.elapsed_seconds;
            if span <= 0.0 {
                result.push(Some(p1.heart_rate));
                continue;
            }
            let ratio = (t - p1.elapsed_seconds) / span;
            let hr1 = f64::from(p1.heart_rate);
            let hr2 = f64::from(p2.heart_rate);
            let value = round_half_up(hr1 + ratio * (hr2 - hr1));
            result.push(Some(value as u16));
        }
    }

    Ok(result)
}

/// Format seconds as `M:SS`
pub fn format_time(total_seconds: f64) -> String {
    let minutes = (total_seconds / 60.0).floor() as i64;
    let seconds = round_half_up(total_seconds % 60.0) as i64;
    format!("{}:{:02}", minutes, seconds)
}

/// A fixed-step time axis starting at zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeGrid {
    step_seconds: f64,
    max_time: f64,
}

/// Inclusive range of grid indices covering a highlighted time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpan {
    pub start_index: usize,
    pub end_index: usize,
}

impl TimeGrid {
    pub fn new(step_seconds: f64, max_time: f64) -> Result<Self, CalculationError> {
        validate_grid(step_seconds, max_time)?;
        Ok(Self {
            step_seconds,
            max_time,
        })
    }

    /// Grid covering the whole series
    pub fn for_series(series: &Series, step_seconds: f64) -> Result<Self, CalculationError> {
        Self::new(step_seconds, series.total_duration_seconds())
    }

    pub fn step_seconds(&self) -> f64 {
        self.step_seconds
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        grid_len(self.step_seconds, self.max_time)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elapsed time of every grid point
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| i as f64 * self.step_seconds)
    }

    /// `M:SS` axis labels
    pub fn labels(&self) -> Vec<String> {
        self.times().map(format_time).collect()
    }

    /// Nearest grid index for a time, clamped to the grid
    pub fn index_for(&self, seconds: f64) -> usize {
        let last = self.len().saturating_sub(1);
        let index = round_half_up(seconds / self.step_seconds);
        if index <= 0.0 || index.is_nan() {
            0
        } else {
            (index as usize).min(last)
        }
    }

    /// Grid indices to shade for a highlighted time range
    pub fn span_for(&self, range: &TimeRange) -> GridSpan {
        GridSpan {
            start_index: self.index_for(range.start_seconds),
            end_index: self.index_for(range.end_seconds),
        }
    }

    pub fn resample(&self, series: &Series) -> Vec<Option<u16>> {
        // Parameters were validated on construction
        resample_to_interval(series, self.step_seconds, self.max_time).unwrap_or_default()
    }
}

fn grid_len(step_seconds: f64, max_time: f64) -> usize {
    (max_time / step_seconds).floor() as usize + 1
}

fn validate_grid(step_seconds: f64, max_time: f64) -> Result<(), CalculationError> {
    if !step_seconds.is_finite() || step_seconds <= 0.0 {
        return Err(CalculationError::invalid_parameter(
            "resample",
            "step_seconds",
            step_seconds,
        ));
    }
    if !max_time.is_finite() || max_time < 0.0 {
        return Err(CalculationError::invalid_parameter(
            "resample",
            "max_time",
            max_time,
        ));
    }
    Ok(())
}
