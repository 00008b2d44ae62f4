use serde::Serialize;

use crate::models::{round_half_up, Highlight, Series, TimeRange};
use crate::zones::{ZoneClass, ZoneModel, HR_ZONES};

/// Time spent in one zone bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneTime {
    pub class: ZoneClass,
    pub seconds: f64,
    /// Whole-number share of the total time
    pub percent: u32,
}

/// Per-zone time totals for a workout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneTimeBreakdown {
    /// One entry per zone, in zone order
    pub zones: Vec<ZoneTime>,
    pub below_zones: ZoneTime,
    pub total_seconds: f64,
}

impl ZoneTimeBreakdown {
    /// Attribute the time between consecutive samples to the later sample's zone
    pub fn calculate(series: &Series, model: &ZoneModel) -> Self {
        let mut zone_seconds = [0.0_f64; HR_ZONES.len()];
        let mut below_seconds = 0.0_f64;

        for (previous, current) in series.pairs() {
            let dt = current.elapsed_seconds - previous.elapsed_seconds;
            match model.classify(current.heart_rate) {
                ZoneClass::Zone(index) => zone_seconds[index] += dt,
                ZoneClass::BelowZones => below_seconds += dt,
            }
        }

        let total_seconds = zone_seconds.iter().sum::<f64>() + below_seconds;
        let share = |seconds: f64| -> u32 {
            if total_seconds > 0.0 {
                round_half_up(seconds / total_seconds * 100.0) as u32
            } else {
                0
            }
        };

        let zones = zone_seconds
            .iter()
            .enumerate()
            .map(|(index, &seconds)| ZoneTime {
                class: ZoneClass::Zone(index),
                seconds,
                percent: share(seconds),
            })
            .collect();

        Self {
            zones,
            below_zones: ZoneTime {
                class: ZoneClass::BelowZones,
                seconds: below_seconds,
                percent: share(below_seconds),
            },
            total_seconds,
        }
    }

    pub fn zone(&self, index: usize) -> Option<&ZoneTime> {
        self.zones.get(index)
    }

    /// Buckets with time in them, below-zones first, for doughnut charts
    pub fn chart_segments(&self) -> Vec<ZoneTime> {
        let mut segments = Vec::with_capacity(self.zones.len() + 1);
        if self.below_zones.seconds > 0.0 {
            segments.push(self.below_zones);
        }
        segments.extend(self.zones.iter().copied());
        segments
    }

    /// The zone with the most time, if any time was spent in a zone
    pub fn dominant_zone(&self) -> Option<&ZoneTime> {
        self.zones
            .iter()
            .filter(|z| z.seconds > 0.0)
            .fold(None, |best: Option<&ZoneTime>, z| match best {
                Some(b) if b.seconds >= z.seconds => Some(b),
                _ => Some(z),
            })
    }
}

impl Highlight for ZoneTimeBreakdown {
    /// Zone time is shown as horizontal bands rather than a time range
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        Vec::new()
    }
}
