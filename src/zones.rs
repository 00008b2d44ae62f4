use serde::Serialize;

use crate::error::CalculationError;
use crate::models::round_half_up;

/// Default maximum heart rate used when none is configured
pub const DEFAULT_MAX_HR: u16 = 190;

/// Static description of one heart-rate intensity zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Zone {
    /// Position in the catalog, 0 (easiest) to 4 (hardest)
    pub index: usize,
    pub name: &'static str,
    pub short_label: &'static str,
    /// Lower bound as a fraction of max HR (inclusive)
    pub min_fraction: f64,
    /// Upper bound as a fraction of max HR
    pub max_fraction: f64,
    /// Line / swatch colour for charts
    pub display_color: &'static str,
    /// Translucent band colour for chart overlays
    pub fill_color: &'static str,
}

/// Five-zone model based on percentage of maximum heart rate:
/// - Z1: 50-60% (Recovery)
/// - Z2: 60-70% (Endurance)
/// - Z3: 70-80% (Tempo)
/// - Z4: 80-90% (Threshold)
/// - Z5: 90-100% (VO2 Max)
pub const HR_ZONES: [Zone; 5] = [
    Zone {
        index: 0,
        name: "Recovery",
        short_label: "Z1",
        min_fraction: 0.50,
        max_fraction: 0.60,
        display_color: "#6b8f71",
        fill_color: "rgba(107, 143, 113, 0.18)",
    },
    Zone {
        index: 1,
        name: "Endurance",
        short_label: "Z2",
        min_fraction: 0.60,
        max_fraction: 0.70,
        display_color: "#5fa06e",
        fill_color: "rgba(95, 160, 110, 0.18)",
    },
    Zone {
        index: 2,
        name: "Tempo",
        short_label: "Z3",
        min_fraction: 0.70,
        max_fraction: 0.80,
        display_color: "#c9a277",
        fill_color: "rgba(201, 162, 119, 0.20)",
    },
    Zone {
        index: 3,
        name: "Threshold",
        short_label: "Z4",
        min_fraction: 0.80,
        max_fraction: 0.90,
        display_color: "#a85f52",
        fill_color: "rgba(168, 95, 82, 0.18)",
    },
    Zone {
        index: 4,
        name: "VO2 Max",
        short_label: "Z5",
        min_fraction: 0.90,
        max_fraction: 1.00,
        display_color: "#8a4134",
        fill_color: "rgba(138, 65, 52, 0.22)",
    },
];

/// Where a heart rate falls in the zone model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum ZoneClass {
    /// Below the lowest zone's lower bound
    BelowZones,
    /// Index into [`HR_ZONES`]
    Zone(usize),
}

impl ZoneClass {
    pub fn zone(&self) -> Option<&'static Zone> {
        match self {
            ZoneClass::BelowZones => None,
            ZoneClass::Zone(index) => HR_ZONES.get(*index),
        }
    }

    pub fn label(&self) -> &'static str {
        self.zone().map_or("Below Z1", |z| z.name)
    }

    pub fn short_label(&self) -> &'static str {
        self.zone().map_or("<Z1", |z| z.short_label)
    }
}

/// A zone resolved to absolute bpm bounds, for chart overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneBand {
    pub zone: Zone,
    pub min_bpm: u16,
    pub max_bpm: u16,
}

/// Zone boundaries for a given maximum heart rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneModel {
    max_hr: u16,
}

impl Default for ZoneModel {
    fn default() -> Self {
        Self {
            max_hr: DEFAULT_MAX_HR,
        }
    }
}

impl ZoneModel {
    /// Create a zone model, validating the maximum heart rate
    pub fn new(max_hr: u16) -> Result<Self, CalculationError> {
        Self::validate_max_hr(max_hr)?;
        Ok(Self { max_hr })
    }

    pub fn max_hr(&self) -> u16 {
        self.max_hr
    }

    /// `round(max_hr * fraction)` in bpm
    pub fn bpm_at(&self, fraction: f64) -> u16 {
        round_half_up(f64::from(self.max_hr) * fraction) as u16
    }

    pub fn lower_bound(&self, zone: &Zone) -> u16 {
        self.bpm_at(zone.min_fraction)
    }

    pub fn upper_bound(&self, zone: &Zone) -> u16 {
        self.bpm_at(zone.max_fraction)
    }

    /// Determine which zone a heart rate falls into.
    ///
    /// Zones are scanned from the hardest down; the first whose lower bound
    /// is at or below `hr` wins, so the top zone is unbounded above.
    pub fn classify(&self, hr: u16) -> ZoneClass {
        HR_ZONES
            .iter()
            .rev()
            .find(|zone| hr >= self.lower_bound(zone))
            .map_or(ZoneClass::BelowZones, |zone| ZoneClass::Zone(zone.index))
    }

    /// Absolute bpm bands for every zone
    pub fn bands(&self) -> Vec<ZoneBand> {
        HR_ZONES
            .iter()
            .map(|zone| ZoneBand {
                zone: *zone,
                min_bpm: self.lower_bound(zone),
                max_bpm: self.upper_bound(zone),
            })
            .collect()
    }

    fn validate_max_hr(max_hr: u16) -> Result<(), CalculationError> {
        if !(100..=250).contains(&max_hr) {
            return Err(CalculationError::invalid_parameter(
                "zone model",
                "max_hr",
                format!("{} (must be between 100 and 250 bpm)", max_hr),
            ));
        }
        Ok(())
    }
}
