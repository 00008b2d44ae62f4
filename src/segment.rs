use serde::Serialize;

use crate::models::{mean_heart_rate, round_half_up};
use crate::resample::{format_time, TimeGrid};
use crate::zones::{ZoneClass, ZoneModel, HR_ZONES};

/// Statistics for a user-selected stretch of the resampled chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentStats {
    pub start_label: String,
    pub end_label: String,
    pub average_hr: u16,
    pub max_hr: u16,
    pub min_hr: u16,
    /// Grid points with a value inside the selection
    pub count: usize,
    /// Grid points per zone; values below Z1 are not counted
    pub zone_counts: [usize; 5],
}

impl SegmentStats {
    /// Summarize grid points `start_index..=end_index`.
    ///
    /// Indices are clamped to the grid and swapped if given backwards. Grid
    /// points past the end of the workout are skipped; `None` is returned if
    /// the selection holds no values at all.
    pub fn compute(
        resampled: &[Option<u16>],
        grid: &TimeGrid,
        start_index: usize,
        end_index: usize,
        zones: &ZoneModel,
    ) -> Option<Self> {
        let last = resampled.len().checked_sub(1)?;
        let (start, end) = if start_index <= end_index {
            (start_index, end_index)
        } else {
            (end_index, start_index)
        };
        let (start, end) = (start.min(last), end.min(last));

        let values: Vec<u16> = resampled[start..=end].iter().flatten().copied().collect();
        let average = mean_heart_rate(values.iter().copied())?;

        let mut zone_counts = [0usize; HR_ZONES.len()];
        for &hr in &values {
            if let ZoneClass::Zone(index) = zones.classify(hr) {
                zone_counts[index] += 1;
            }
        }

        let label = |index: usize| format_time(index as f64 * grid.step_seconds());

        Some(Self {
            start_label: label(start),
            end_label: label(end),
            average_hr: round_half_up(average) as u16,
            max_hr: values.iter().copied().max().unwrap_or_default(),
            min_hr: values.iter().copied().min().unwrap_or_default(),
            count: values.len(),
            zone_counts,
        })
    }

    /// Whole-number share of the selection's values in a zone
    pub fn zone_percent(&self, index: usize) -> u32 {
        match (self.zone_counts.get(index), self.count) {
            (Some(&zone_count), count) if count > 0 => {
                round_half_up(zone_count as f64 / count as f64 * 100.0) as u32
            }
            _ => 0,
        }
    }
}
