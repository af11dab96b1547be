use super::rules::{Progress, ScoreNode};
use serde::{Deserialize, Serialize};

/// Evaluation output consumed by display and export collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityReport {
    pub questionnaire: String,
    pub dimensions: Vec<DimensionResult>,
    pub global: GlobalResult,
    pub diagnostics: AnswerDiagnostics,
}

impl MaturityReport {
    pub fn dimension(&self, id: &str) -> Option<&DimensionResult> {
        self.dimensions.iter().find(|dimension| dimension.id == id)
    }

    pub fn excluded_dimensions(&self) -> impl Iterator<Item = &DimensionResult> {
        self.dimensions.iter().filter(|dimension| dimension.excluded)
    }
}

/// Scores for one dimension. Percentage and level are reported even when the
/// dimension is excluded from the global rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub id: String,
    pub name: String,
    pub earned: f64,
    pub max: f64,
    pub percentage: f64,
    pub level: String,
    pub excluded: bool,
    pub not_applicable_ratio: f64,
    pub progress: Progress,
    pub subdimensions: Vec<SubdimensionResult>,
}

impl DimensionResult {
    pub fn score(&self) -> ScoreNode {
        ScoreNode::new(self.earned, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdimensionResult {
    pub id: String,
    pub name: String,
    pub earned: f64,
    pub max: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalResult {
    pub earned: f64,
    pub max: f64,
    pub percentage: f64,
    pub level: String,
    /// Which threshold table produced `level`, e.g. `flat` or `dimension:<name>`.
    pub level_policy: String,
    pub excluded_dimensions: Vec<String>,
    pub progress: Progress,
}

impl GlobalResult {
    pub fn score(&self) -> ScoreNode {
        ScoreNode::new(self.earned, self.max)
    }
}

/// Answer entries the scorer could not use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerDiagnostics {
    /// Keys that name no indicator of the questionnaire.
    pub unknown_indicators: Vec<String>,
    /// Values matching no option of their indicator; scored as unanswered.
    pub unrecognized_answers: Vec<UnrecognizedAnswer>,
    /// Answers stored for indicators that are currently ineligible.
    pub stale_answers: Vec<String>,
}

impl AnswerDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.unknown_indicators.is_empty()
            && self.unrecognized_answers.is_empty()
            && self.stale_answers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnrecognizedAnswer {
    pub indicator: String,
    pub value: String,
}
