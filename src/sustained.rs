use serde::Serialize;
use std::fmt;

use crate::models::{mean_heart_rate, round_half_up, Highlight, Insight, Series, TimeRange};
use crate::zones::ZoneModel;

/// Lower edge of the aerobic band (bottom of Z2)
pub const AEROBIC_MIN_FRACTION: f64 = 0.60;

/// Upper edge of the aerobic band (top of Z3)
pub const AEROBIC_MAX_FRACTION: f64 = 0.80;

/// Runs shorter than this are not reported
pub const MIN_SUSTAINED_SECONDS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SustainedRating {
    Elite,
    Strong,
    Building,
    Developing,
}

impl SustainedRating {
    pub fn from_duration(duration_seconds: f64) -> Self {
        if duration_seconds >= 3600.0 {
            SustainedRating::Elite
        } else if duration_seconds >= 1800.0 {
            SustainedRating::Strong
        } else if duration_seconds >= 600.0 {
            SustainedRating::Building
        } else {
            SustainedRating::Developing
        }
    }
}

impl fmt::Display for SustainedRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SustainedRating::Elite => write!(f, "Elite"),
            SustainedRating::Strong => write!(f, "Strong"),
            SustainedRating::Building => write!(f, "Building"),
            SustainedRating::Developing => write!(f, "Developing"),
        }
    }
}

/// Longest unbroken stretch in the aerobic band
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SustainedEffort {
    pub start_time: f64,
    pub end_time: f64,
    pub duration_seconds: f64,
    pub average_hr: u16,
    pub band_min: u16,
    pub band_max: u16,
    pub rating: SustainedRating,
}

impl Highlight for SustainedEffort {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        vec![TimeRange::new(self.start_time, self.end_time)]
    }
}

pub struct SustainedEffortFinder {
    zones: ZoneModel,
}

impl SustainedEffortFinder {
    pub fn new(zones: ZoneModel) -> Self {
        Self { zones }
    }

    /// Inclusive bpm band counted as aerobic
    pub fn band(&self) -> (u16, u16) {
        (
            self.zones.bpm_at(AEROBIC_MIN_FRACTION),
            self.zones.bpm_at(AEROBIC_MAX_FRACTION),
        )
    }

    /// Find the in-band run with the longest elapsed span.
    ///
    /// Any single out-of-band sample ends the current run. A later run only
    /// replaces the best one when strictly longer.
    pub fn find(&self, series: &Series) -> Insight<SustainedEffort> {
        let (band_min, band_max) = self.band();
        let samples = series.samples();

        let mut best: Option<(usize, usize)> = None;
        let mut best_duration = 0.0_f64;
        let mut run_start: Option<usize> = None;

        for (index, sample) in samples.iter().enumerate() {
            if !(band_min..=band_max).contains(&sample.heart_rate) {
                run_start = None;
                continue;
            }

            let start = *run_start.get_or_insert(index);
            let duration = sample.elapsed_seconds - samples[start].elapsed_seconds;
            if duration > best_duration {
                best_duration = duration;
                best = Some((start, index));
            }
        }

        let Some((start, end)) = best.filter(|_| best_duration >= MIN_SUSTAINED_SECONDS) else {
            return Insight::not_applicable(
                "sustained aerobic effort",
                format!(
                    "no stretch of at least {}s between {} and {} bpm",
                    MIN_SUSTAINED_SECONDS, band_min, band_max
                ),
            );
        };

        let average = mean_heart_rate(samples[start..=end].iter().map(|s| s.heart_rate))
            .unwrap_or_default();

        Insight::Available(SustainedEffort {
            start_time: samples[start].elapsed_seconds,
            end_time: samples[end].elapsed_seconds,
            duration_seconds: best_duration,
            average_hr: round_half_up(average) as u16,
            band_min,
            band_max,
            rating: SustainedRating::from_duration(best_duration),
        })
    }
}

impl Default for SustainedEffortFinder {
    fn default() -> Self {
        Self::new(ZoneModel::default())
    }
}
