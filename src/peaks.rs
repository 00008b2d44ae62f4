use serde::Serialize;

use crate::models::{round_half_up, Highlight, Insight, Interval, Series, TimeRange};

/// Shortest window searched by default
pub const ONE_MINUTE_SECONDS: f64 = 60.0;

/// Longest window searched by default; skipped for shorter workouts
pub const FIVE_MINUTES_SECONDS: f64 = 300.0;

/// Fraction of the window a candidate must actually cover
const MIN_COVERAGE: f64 = 0.5;

/// Find the window of roughly `window_seconds` with the highest mean heart rate.
///
/// Each sample starts a candidate window holding every later sample up to
/// `start + window_seconds`. Candidates covering less than half the window are
/// ignored. The first strictly best mean wins.
pub fn find_peak_interval(series: &Series, window_seconds: f64) -> Insight<Interval> {
    let samples = series.samples();
    let mut best: Option<(f64, usize, usize)> = None;

    for (start, first) in samples.iter().enumerate() {
        let end_time = first.elapsed_seconds + window_seconds;

        let mut sum = 0u64;
        let mut count = 0u64;
        let mut last = start;
        for (offset, sample) in samples[start..].iter().enumerate() {
            if sample.elapsed_seconds > end_time {
                break;
            }
            sum += u64::from(sample.heart_rate);
            count += 1;
            last = start + offset;
        }

        let average = sum as f64 / count as f64;
        let covered = samples[last].elapsed_seconds - first.elapsed_seconds;
        if covered < window_seconds * MIN_COVERAGE {
            continue;
        }
        if best.map_or(true, |(best_avg, _, _)| average > best_avg) {
            best = Some((average, start, last));
        }
    }

    let Some((average, start, end)) = best else {
        return Insight::not_applicable(
            "peak interval",
            format!("no stretch of the workout covers half of a {}s window", window_seconds),
        );
    };

    let max_hr = samples[start..=end]
        .iter()
        .map(|s| s.heart_rate)
        .max()
        .unwrap_or_default();

    Insight::Available(Interval {
        start_time: samples[start].elapsed_seconds,
        end_time: samples[end].elapsed_seconds,
        average_hr: round_half_up(average) as u16,
        max_hr,
    })
}

/// Hardest one- and five-minute efforts of a workout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakIntervals {
    pub one_minute: Insight<Interval>,
    pub five_minutes: Insight<Interval>,
}

impl PeakIntervals {
    pub fn find(series: &Series) -> Self {
        let one_minute = find_peak_interval(series, ONE_MINUTE_SECONDS);
        let five_minutes = if series.total_duration_seconds() >= FIVE_MINUTES_SECONDS {
            find_peak_interval(series, FIVE_MINUTES_SECONDS)
        } else {
            Insight::not_applicable("peak interval", "workout is shorter than 5 minutes")
        };

        Self {
            one_minute,
            five_minutes,
        }
    }
}

impl Highlight for PeakIntervals {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        let mut ranges = self.one_minute.highlight_ranges();
        ranges.extend(self.five_minutes.highlight_ranges());
        ranges
    }
}
