//! Heart-rate recovery after hard efforts
//!
//! A fast drop in heart rate once an effort stops is a common marker of
//! aerobic fitness. This module finds local heart-rate peaks in a workout and
//! measures how far heart rate falls in the 60 seconds that follow each one.
//!
//! # Peak detection
//!
//! - A peak is a sample at or above 70% of max HR with no strictly higher
//!   sample within 30 seconds either side.
//! - Peaks less than 60 seconds after the previously kept peak compete with
//!   it: the later one replaces it only when strictly higher.
//! - Recovery is the peak HR minus the first sample at least 60 seconds later.
//!   Peaks too close to the end of the workout are skipped.

use serde::Serialize;

use crate::models::{round_half_up, Highlight, Insight, Sample, Series, TimeRange};
use crate::zones::ZoneModel;

/// Fraction of max HR a sample must reach to count as a peak
pub const PEAK_THRESHOLD_FRACTION: f64 = 0.70;

/// Half-width of the local-maximum window
pub const PEAK_WINDOW_SECONDS: f64 = 30.0;

/// How long after a peak the recovery heart rate is read
pub const RECOVERY_WINDOW_SECONDS: f64 = 60.0;

/// Rows shown in the recovery table
pub const DEFAULT_TOP_RECOVERIES: usize = 5;

/// Heart-rate drop measured after one peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecoveryMeasurement {
    pub peak_time: f64,
    pub peak_hr: u16,
    pub hr_after_60s: u16,
    /// Positive when heart rate fell; negative if it kept climbing
    pub drop: i32,
}

impl RecoveryMeasurement {
    pub fn window(&self) -> TimeRange {
        TimeRange::new(self.peak_time, self.peak_time + RECOVERY_WINDOW_SECONDS)
    }
}

/// All recovery measurements for a workout plus their summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryAnalysis {
    pub measurements: Vec<RecoveryMeasurement>,
    pub average_drop: i32,
    pub best_drop: i32,
    pub peak_count: usize,
}

impl RecoveryAnalysis {
    /// Best recoveries first; ties keep workout order
    pub fn top_recoveries(&self, n: usize) -> Vec<RecoveryMeasurement> {
        let mut sorted = self.measurements.clone();
        sorted.sort_by(|a, b| b.drop.cmp(&a.drop));
        sorted.truncate(n);
        sorted
    }
}

impl Highlight for RecoveryAnalysis {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        self.measurements.iter().map(|m| m.window()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Peak {
    index: usize,
    time: f64,
    hr: u16,
}

/// Recovery-rate detector
pub struct RecoveryDetector {
    zones: ZoneModel,
}

impl RecoveryDetector {
    pub fn new(zones: ZoneModel) -> Self {
        Self { zones }
    }

    /// Minimum bpm a sample needs to be considered a peak
    pub fn threshold(&self) -> u16 {
        self.zones.bpm_at(PEAK_THRESHOLD_FRACTION)
    }

    pub fn analyze(&self, series: &Series) -> Insight<RecoveryAnalysis> {
        let samples = series.samples();
        let peaks = self.find_peaks(samples);

        let measurements: Vec<RecoveryMeasurement> = peaks
            .iter()
            .filter_map(|peak| Self::measure(samples, peak))
            .collect();

        tracing::debug!(
            peaks = peaks.len(),
            measured = measurements.len(),
            threshold = self.threshold(),
            "recovery detection finished"
        );

        if measurements.is_empty() {
            return Insight::not_applicable(
                "recovery rate",
                "no significant heart-rate peaks with 60 seconds of data after them",
            );
        }

        let total: i64 = measurements.iter().map(|m| i64::from(m.drop)).sum();
        let average_drop = round_half_up(total as f64 / measurements.len() as f64) as i32;
        let best_drop = measurements.iter().map(|m| m.drop).max().unwrap_or_default();

        Insight::Available(RecoveryAnalysis {
            peak_count: measurements.len(),
            measurements,
            average_drop,
            best_drop,
        })
    }

    fn find_peaks(&self, samples: &[Sample]) -> Vec<Peak> {
        let threshold = self.threshold();
        let mut peaks: Vec<Peak> = Vec::new();

        for (index, sample) in samples.iter().enumerate() {
            if sample.heart_rate < threshold || !Self::is_local_max(samples, index) {
                continue;
            }

            if let Some(last) = peaks.last() {
                if sample.elapsed_seconds - last.time < RECOVERY_WINDOW_SECONDS {
                    if sample.heart_rate > last.hr {
                        peaks.pop();
                    } else {
                        continue;
                    }
                }
            }

            peaks.push(Peak {
                index,
                time: sample.elapsed_seconds,
                hr: sample.heart_rate,
            });
        }

        peaks
    }

    fn is_local_max(samples: &[Sample], index: usize) -> bool {
        let center = samples[index];

        let before = samples[..index]
            .iter()
            .rev()
            .take_while(|s| center.elapsed_seconds - s.elapsed_seconds <= PEAK_WINDOW_SECONDS);
        let after = samples[index + 1..]
            .iter()
            .take_while(|s| s.elapsed_seconds - center.elapsed_seconds <= PEAK_WINDOW_SECONDS);

        !before.chain(after).any(|s| s.heart_rate > center.heart_rate)
    }

    fn measure(samples: &[Sample], peak: &Peak) -> Option<RecoveryMeasurement> {
        let target = peak.time + RECOVERY_WINDOW_SECONDS;
        let after = samples[peak.index..]
            .iter()
            .find(|s| s.elapsed_seconds >= target)?;

        Some(RecoveryMeasurement {
            peak_time: peak.time,
            peak_hr: peak.hr,
            hr_after_60s: after.heart_rate,
            drop: i32::from(peak.hr) - i32::from(after.heart_rate),
        })
    }
}

impl Default for RecoveryDetector {
    fn default() -> Self {
        Self::new(ZoneModel::default())
    }
}
