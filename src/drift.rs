use serde::Serialize;
use std::fmt;

use crate::models::{mean_heart_rate, Highlight, Insight, Series, TimeRange};

/// Shortest workout that gets a drift estimate
pub const MIN_DRIFT_DURATION_SECONDS: f64 = 600.0;

/// How well heart rate held steady across the workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriftRating {
    Excellent,
    Normal,
    NeedsWork,
}

impl DriftRating {
    /// Rate a signed drift percentage; falling heart rate rates as excellent
    pub fn from_percent(drift_percent: f64) -> Self {
        if drift_percent <= 5.0 {
            DriftRating::Excellent
        } else if drift_percent <= 10.0 {
            DriftRating::Normal
        } else {
            DriftRating::NeedsWork
        }
    }
}

impl fmt::Display for DriftRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftRating::Excellent => write!(f, "Excellent"),
            DriftRating::Normal => write!(f, "Normal"),
            DriftRating::NeedsWork => write!(f, "Needs Work"),
        }
    }
}

/// First-half vs second-half heart-rate comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardiacDrift {
    pub first_half_avg: f64,
    pub second_half_avg: f64,
    pub drift_bpm: f64,
    pub drift_percent: f64,
    pub rating: DriftRating,
    pub midpoint_seconds: f64,
    pub total_seconds: f64,
}

impl CardiacDrift {
    /// Compare mean heart rate before and after the workout's time midpoint.
    ///
    /// Samples exactly at the midpoint belong to the first half.
    pub fn calculate(series: &Series) -> Insight<CardiacDrift> {
        let total_seconds = series.total_duration_seconds();
        if total_seconds < MIN_DRIFT_DURATION_SECONDS {
            return Insight::not_applicable(
                "cardiac drift",
                "workout is too short for cardiac drift analysis (need 10+ minutes)",
            );
        }

        let midpoint_seconds = total_seconds / 2.0;
        let samples = series.samples();
        let halves = (
            mean_heart_rate(
                samples
                    .iter()
                    .filter(|s| s.elapsed_seconds <= midpoint_seconds)
                    .map(|s| s.heart_rate),
            ),
            mean_heart_rate(
                samples
                    .iter()
                    .filter(|s| s.elapsed_seconds > midpoint_seconds)
                    .map(|s| s.heart_rate),
            ),
        );
        let (Some(first_half_avg), Some(second_half_avg)) = halves else {
            return Insight::not_applicable("cardiac drift", "one half of the workout has no samples");
        };

        let drift_bpm = second_half_avg - first_half_avg;
        let drift_percent = drift_bpm / first_half_avg * 100.0;

        Insight::Available(CardiacDrift {
            first_half_avg,
            second_half_avg,
            drift_bpm,
            drift_percent,
            rating: DriftRating::from_percent(drift_percent),
            midpoint_seconds,
            total_seconds,
        })
    }
}

impl Highlight for CardiacDrift {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        vec![
            TimeRange::new(0.0, self.midpoint_seconds),
            TimeRange::new(self.midpoint_seconds, self.total_seconds),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sample;

    fn series(points: &[(f64, u16)]) -> Series {
        let samples = points.iter().map(|&(t, hr)| Sample::new(t, hr)).collect();
        Series::new("Steady", "2024-01-01", samples).unwrap()
    }

    #[test]
    fn test_flat_series_has_no_drift() {
        let points: Vec<(f64, u16)> = (0..=60).map(|k| ((k * 10) as f64, 140)).collect();
        let drift = CardiacDrift::calculate(&series(&points)).into_available().unwrap();

        assert_eq!(drift.drift_percent, 0.0);
        assert_eq!(drift.drift_bpm, 0.0);
        assert_eq!(drift.rating, DriftRating::Excellent);
        assert_eq!(drift.midpoint_seconds, 300.0);
    }

    #[test]
    fn test_rising_heart_rate() {
        // 600s workout; midpoint 300 goes to the first half
        let s = series(&[(0.0, 140), (150.0, 140), (300.0, 140), (450.0, 154), (600.0, 154)]);
        let drift = CardiacDrift::calculate(&s).into_available().unwrap();

        assert_eq!(drift.first_half_avg, 140.0);
        assert_eq!(drift.second_half_avg, 154.0);
        assert!((drift.drift_percent - 10.0).abs() < 1e-9);
        assert_eq!(drift.rating, DriftRating::Normal);
        assert_eq!(
            drift.highlight_ranges(),
            vec![TimeRange::new(0.0, 300.0), TimeRange::new(300.0, 600.0)]
        );
    }

    #[test]
    fn test_falling_heart_rate_is_excellent() {
        let s = series(&[(0.0, 160), (300.0, 160), (600.0, 120)]);
        let drift = CardiacDrift::calculate(&s).into_available().unwrap();
        assert!(drift.drift_percent < 0.0);
        assert_eq!(drift.rating, DriftRating::Excellent);
    }

    #[test]
    fn test_short_workout_not_applicable() {
        let s = series(&[(0.0, 140), (599.0, 150)]);
        assert!(!CardiacDrift::calculate(&s).is_available());
    }

    #[test]
    fn test_late_start_leaves_first_half_empty() {
        let s = series(&[(400.0, 140), (700.0, 150)]);
        assert!(matches!(CardiacDrift::calculate(&s), Insight::NotApplicable(_)));
    }

    #[test]
    fn test_midpoint_sample_counts_in_first_half() {
        let s = series(&[(0.0, 120), (300.0, 180), (600.0, 150)]);
        let drift = CardiacDrift::calculate(&s).into_available().unwrap();

        assert_eq!(drift.first_half_avg, 150.0);
        assert_eq!(drift.second_half_avg, 150.0);
        assert_eq!(drift.drift_bpm, 0.0);
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(DriftRating::from_percent(5.0), DriftRating::Excellent);
        assert_eq!(DriftRating::from_percent(5.1), DriftRating::Normal);
        assert_eq!(DriftRating::from_percent(10.0), DriftRating::Normal);
        assert_eq!(DriftRating::from_percent(10.5), DriftRating::NeedsWork);
        assert_eq!(DriftRating::NeedsWork.to_string(), "Needs Work");
    }
}
