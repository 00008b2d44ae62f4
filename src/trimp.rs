//! Zone-weighted training impulse (TRIMP)
//!
//! Minutes spent in each heart-rate zone are multiplied by the zone's weight
//! (1 for Z1 up to 5 for Z5) and summed. Time below Z1 carries no load.

use serde::Serialize;
use std::fmt;

use crate::models::{round_half_up, Highlight, Series, TimeRange};
use crate::zones::{Zone, ZoneClass, ZoneModel, HR_ZONES};

/// Load weight per zone, Z1 first
pub const ZONE_WEIGHTS: [u32; 5] = [1, 2, 3, 4, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrimpRating {
    Easy,
    Moderate,
    Hard,
    VeryHard,
}

impl TrimpRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 300 => TrimpRating::VeryHard,
            s if s >= 200 => TrimpRating::Hard,
            s if s >= 100 => TrimpRating::Moderate,
            _ => TrimpRating::Easy,
        }
    }
}

impl fmt::Display for TrimpRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimpRating::Easy => write!(f, "Easy"),
            TrimpRating::Moderate => write!(f, "Moderate"),
            TrimpRating::Hard => write!(f, "Hard"),
            TrimpRating::VeryHard => write!(f, "Very Hard"),
        }
    }
}

/// One zone's share of the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimpContribution {
    pub zone: Zone,
    pub minutes: f64,
    pub weight: u32,
    pub contribution: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimpScore {
    pub score: u32,
    pub rating: TrimpRating,
    pub breakdown: Vec<TrimpContribution>,
    pub below_zone_minutes: f64,
}

/// Calculator for zone-weighted training load
pub struct TrimpCalculator {
    zones: ZoneModel,
}

impl TrimpCalculator {
    pub fn new(zones: ZoneModel) -> Self {
        Self { zones }
    }

    /// Each contribution is rounded before summing, so the score always
    /// equals the sum of the breakdown column.
    pub fn calculate(&self, series: &Series) -> TrimpScore {
        let mut zone_minutes = [0.0_f64; HR_ZONES.len()];
        let mut below_zone_minutes = 0.0_f64;

        for (previous, current) in series.pairs() {
            let minutes = (current.elapsed_seconds - previous.elapsed_seconds) / 60.0;
            match self.zones.classify(current.heart_rate) {
                ZoneClass::Zone(index) => zone_minutes[index] += minutes,
                ZoneClass::BelowZones => below_zone_minutes += minutes,
            }
        }

        let breakdown: Vec<TrimpContribution> = HR_ZONES
            .iter()
            .zip(ZONE_WEIGHTS)
            .zip(zone_minutes)
            .map(|((zone, weight), minutes)| TrimpContribution {
                zone: *zone,
                minutes,
                weight,
                contribution: round_half_up(minutes * f64::from(weight)) as u32,
            })
            .collect();

        let score = breakdown.iter().map(|c| c.contribution).sum();

        TrimpScore {
            score,
            rating: TrimpRating::from_score(score),
            breakdown,
            below_zone_minutes,
        }
    }
}

impl Default for TrimpCalculator {
    fn default() -> Self {
        Self::new(ZoneModel::default())
    }
}

impl Highlight for TrimpScore {
    fn highlight_ranges(&self) -> Vec<TimeRange> {
        Vec::new()
    }
}
