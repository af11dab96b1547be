use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const INICIAL: &str = "Inicial";
pub const MEDIO: &str = "Medio";
pub const AVANZADO: &str = "Avanzado";

/// Largest gap tolerated between adjacent bands, so tables written with
/// two-decimal upper bounds (`59.99` / `60`) still count as contiguous.
const CONTIGUITY_TOLERANCE: f64 = 0.01 + 1e-9;

/// Named percentage range. `min` is inclusive and wins over the lower band's `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBand {
    pub level: String,
    pub min: f64,
    pub max: f64,
}

impl LevelBand {
    pub fn new(level: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            level: level.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, percentage: f64) -> bool {
        percentage >= self.min && percentage <= self.max
    }
}

/// Validated band table covering [0, 100], stored in descending `min` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelBand>", into = "Vec<LevelBand>")]
pub struct ThresholdTable {
    bands: Vec<LevelBand>,
}

impl ThresholdTable {
    pub fn new(mut bands: Vec<LevelBand>) -> Result<Self, ThresholdError> {
        if bands.is_empty() {
            return Err(ThresholdError::Empty);
        }

        for band in &bands {
            let in_range = |value: f64| value.is_finite() && (0.0..=100.0).contains(&value);
            if !in_range(band.min) || !in_range(band.max) || band.min > band.max {
                return Err(ThresholdError::InvalidBand {
                    level: band.level.clone(),
                    min: band.min,
                    max: band.max,
                });
            }
        }

        bands.sort_by(|a, b| a.min.total_cmp(&b.min));

        if bands[0].min != 0.0 {
            return Err(ThresholdError::DoesNotStartAtZero { min: bands[0].min });
        }
        let top = &bands[bands.len() - 1];
        if top.max != 100.0 {
            return Err(ThresholdError::DoesNotReachHundred { max: top.max });
        }

        for pair in bands.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if upper.min < lower.max || upper.min == lower.min {
                return Err(ThresholdError::Overlap {
                    lower: lower.level.clone(),
                    upper: upper.level.clone(),
                });
            }
            if upper.min - lower.max > CONTIGUITY_TOLERANCE {
                return Err(ThresholdError::Gap {
                    lower: lower.level.clone(),
                    upper: upper.level.clone(),
                });
            }
        }

        bands.reverse();
        Ok(Self { bands })
    }

    /// Three tiers: Avanzado from 80, Medio from 60, Inicial below.
    pub fn flat() -> Self {
        Self {
            bands: vec![
                LevelBand::new(AVANZADO, 80.0, 100.0),
                LevelBand::new(MEDIO, 60.0, 79.99),
                LevelBand::new(INICIAL, 0.0, 59.99),
            ],
        }
    }

    /// Bands from highest to lowest.
    pub fn bands(&self) -> &[LevelBand] {
        &self.bands
    }

    pub fn classify(&self, percentage: f64) -> &str {
        if let Some(band) = self.bands.iter().find(|band| band.contains(percentage)) {
            return &band.level;
        }

        // Values inside a tolerated two-decimal gap or outside [0, 100] fall to the
        // highest band whose lower bound they reach.
        self.bands
            .iter()
            .find(|band| percentage >= band.min)
            .or_else(|| self.bands.last())
            .map_or(INICIAL, |band| band.level.as_str())
    }
}

impl TryFrom<Vec<LevelBand>> for ThresholdTable {
    type Error = ThresholdError;

    fn try_from(bands: Vec<LevelBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<ThresholdTable> for Vec<LevelBand> {
    fn from(table: ThresholdTable) -> Self {
        table.bands
    }
}

pub fn classify(percentage: f64, table: &ThresholdTable) -> &str {
    table.classify(percentage)
}

/// Which table classifies the global percentage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "dimension", rename_all = "snake_case")]
pub enum GlobalLevelPolicy {
    /// The thresholds' global table.
    #[default]
    Flat,
    /// The table configured for the named dimension.
    DimensionTable(String),
}

impl GlobalLevelPolicy {
    /// Accepts `flat` or `dimension:<name>`.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("flat") {
            return Some(Self::Flat);
        }
        trimmed
            .strip_prefix("dimension:")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Self::DimensionTable(name.to_string()))
    }
}

impl fmt::Display for GlobalLevelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalLevelPolicy::Flat => write!(f, "flat"),
            GlobalLevelPolicy::DimensionTable(name) => write!(f, "dimension:{name}"),
        }
    }
}

/// Threshold tables for one index variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub global: ThresholdTable,
    /// Used by dimensions without a dedicated table.
    pub default: ThresholdTable,
    #[serde(default)]
    pub dimensions: BTreeMap<String, ThresholdTable>,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self::flat()
    }
}

impl ClassificationThresholds {
    pub fn flat() -> Self {
        Self {
            global: ThresholdTable::flat(),
            default: ThresholdTable::flat(),
            dimensions: BTreeMap::new(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn with_dimension(mut self, name: impl Into<String>, table: ThresholdTable) -> Self {
        self.dimensions.insert(name.into(), table);
        self
    }

    pub fn for_dimension(&self, name: &str) -> &ThresholdTable {
        self.dimensions.get(name).unwrap_or(&self.default)
    }

    /// Resolves the global table without falling back: a dimension policy naming a
    /// table that does not exist is an error rather than a silent switch to flat.
    pub fn global_table(&self, policy: &GlobalLevelPolicy) -> Result<&ThresholdTable, ThresholdError> {
        match policy {
            GlobalLevelPolicy::Flat => Ok(&self.global),
            GlobalLevelPolicy::DimensionTable(name) => self
                .dimensions
                .get(name)
                .ok_or_else(|| ThresholdError::UnknownTable(name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold table defines no bands")]
    Empty,
    #[error("band '{level}' has invalid range [{min}, {max}]")]
    InvalidBand { level: String, min: f64, max: f64 },
    #[error("threshold table starts at {min} instead of 0")]
    DoesNotStartAtZero { min: f64 },
    #[error("threshold table ends at {max} instead of 100")]
    DoesNotReachHundred { max: f64 },
    #[error("bands '{lower}' and '{upper}' overlap")]
    Overlap { lower: String, upper: String },
    #[error("bands '{lower}' and '{upper}' leave a gap")]
    Gap { lower: String, upper: String },
    #[error("no threshold table is configured for dimension '{0}'")]
    UnknownTable(String),
}
