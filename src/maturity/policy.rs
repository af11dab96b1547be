use super::answers::AnswerMap;
use super::questionnaire::{Dimension, NOT_APPLICABLE};
use serde::{Deserialize, Serialize};

/// Share of Not Applicable answers a dimension tolerates before it leaves the
/// global rollup. The comparison is strict: exactly this share stays in.
pub const DEFAULT_MAX_NOT_APPLICABLE_RATIO: f64 = 0.25;

/// What the Not Applicable ratio is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionBasis {
    /// Not Applicable indicators over all indicators of the dimension.
    #[default]
    IndicatorCount,
    /// Potential points of Not Applicable indicators over the dimension's potential points.
    PotentialPoints,
}

impl ExclusionBasis {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "indicator_count" | "indicators" | "count" => Some(Self::IndicatorCount),
            "potential_points" | "points" => Some(Self::PotentialPoints),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionAssessment {
    pub not_applicable_ratio: f64,
    pub excluded: bool,
}

/// Decides whether a dimension is dropped from the global score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionPolicy {
    pub basis: ExclusionBasis,
    pub max_not_applicable_ratio: f64,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            basis: ExclusionBasis::IndicatorCount,
            max_not_applicable_ratio: DEFAULT_MAX_NOT_APPLICABLE_RATIO,
        }
    }
}

impl ExclusionPolicy {
    pub fn with_basis(basis: ExclusionBasis) -> Self {
        Self {
            basis,
            ..Self::default()
        }
    }

    /// Share of stored Not Applicable answers, counted regardless of eligibility.
    pub fn not_applicable_ratio(&self, dimension: &Dimension, answers: &AnswerMap) -> f64 {
        let mut flagged = 0.0_f64;
        let mut total = 0.0_f64;

        for indicator in dimension.indicators() {
            let weight = match self.basis {
                ExclusionBasis::IndicatorCount => 1.0,
                ExclusionBasis::PotentialPoints => indicator.max_points(),
            };
            total += weight;
            if answers.get(&indicator.id) == Some(NOT_APPLICABLE) {
                flagged += weight;
            }
        }

        if total > 0.0 {
            flagged / total
        } else {
            0.0
        }
    }

    /// Ratio and decision together; a ratio equal to the maximum is kept.
    pub fn assess(&self, dimension: &Dimension, answers: &AnswerMap) -> ExclusionAssessment {
        let not_applicable_ratio = self.not_applicable_ratio(dimension, answers);
        ExclusionAssessment {
            not_applicable_ratio,
            excluded: not_applicable_ratio > self.max_not_applicable_ratio,
        }
    }

    pub fn is_excluded(&self, dimension: &Dimension, answers: &AnswerMap) -> bool {
        self.assess(dimension, answers).excluded
    }
}

/// Default policy: more than a quarter of the indicators answered Not Applicable.
pub fn is_dimension_excluded(dimension: &Dimension, answers: &AnswerMap) -> bool {
    ExclusionPolicy::default().is_excluded(dimension, answers)
}
