//! Conditional scoring and maturity classification for IMPG audit questionnaires.
//!
//! A [`MaturityEngine`] wraps a validated [`Questionnaire`] and turns a caller-owned
//! [`AnswerMap`] into a [`MaturityReport`]. Evaluation is a pure tree walk: the same
//! questionnaire, answers and thresholds always produce the same report.

mod answers;
pub mod catalog;
mod conditions;
pub mod levels;
mod policy;
mod questionnaire;
mod report;
mod rules;

#[cfg(test)]
mod tests;

pub use answers::{AnswerImportError, AnswerMap};
pub use catalog::{IndexVariant, LoadedVariant};
pub use conditions::{is_eligible, stale_answers};
pub use levels::{
    classify, ClassificationThresholds, GlobalLevelPolicy, LevelBand, ThresholdError,
    ThresholdTable,
};
pub use policy::{
    is_dimension_excluded, ExclusionAssessment, ExclusionBasis, ExclusionPolicy,
    DEFAULT_MAX_NOT_APPLICABLE_RATIO,
};
pub use questionnaire::{
    AnswerOption, Condition, ConfigurationError, ConfigurationWarning, Dimension, Indicator,
    LoadedQuestionnaire, Questionnaire, QuestionnaireDefinition, Subdimension, NOT_APPLICABLE,
};
pub use report::{
    AnswerDiagnostics, DimensionResult, GlobalResult, MaturityReport, SubdimensionResult,
    UnrecognizedAnswer,
};
pub use rules::{
    dimension_progress, score_dimension, score_global, score_indicator, score_subdimension,
    Progress, ScoreNode,
};

use tracing::debug;

/// Stateless evaluator bound to one validated questionnaire.
#[derive(Debug, Clone)]
pub struct MaturityEngine {
    questionnaire: Questionnaire,
    exclusion: ExclusionPolicy,
}

impl MaturityEngine {
    pub fn new(questionnaire: Questionnaire) -> Self {
        Self {
            questionnaire,
            exclusion: ExclusionPolicy::default(),
        }
    }

    pub fn with_exclusion_policy(mut self, exclusion: ExclusionPolicy) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn exclusion_policy(&self) -> &ExclusionPolicy {
        &self.exclusion
    }

    /// Scores every dimension, drops the excluded ones from the global rollup and
    /// classifies with the injected thresholds. Fails only when `global_policy`
    /// names a threshold table that `thresholds` does not define.
    pub fn evaluate(
        &self,
        answers: &AnswerMap,
        thresholds: &ClassificationThresholds,
        global_policy: &GlobalLevelPolicy,
    ) -> Result<MaturityReport, MaturityError> {
        self.evaluate_with(answers, thresholds, global_policy, &self.exclusion)
    }

    /// Same as [`MaturityEngine::evaluate`] with a one-off exclusion policy.
    pub fn evaluate_with(
        &self,
        answers: &AnswerMap,
        thresholds: &ClassificationThresholds,
        global_policy: &GlobalLevelPolicy,
        exclusion: &ExclusionPolicy,
    ) -> Result<MaturityReport, MaturityError> {
        let global_table = thresholds.global_table(global_policy)?;

        let mut global = ScoreNode::EMPTY;
        let mut global_progress = Progress::default();
        let mut excluded_dimensions = Vec::new();
        let mut dimensions = Vec::with_capacity(self.questionnaire.dimensions().len());

        for dimension in self.questionnaire.dimensions() {
            let subdimensions: Vec<SubdimensionResult> = dimension
                .subdimensions
                .iter()
                .map(|subdimension| {
                    let score = score_subdimension(subdimension, answers);
                    SubdimensionResult {
                        id: subdimension.id.clone(),
                        name: subdimension.name.clone(),
                        earned: score.earned,
                        max: score.max,
                        percentage: score.percentage(),
                    }
                })
                .collect();

            let score: ScoreNode = subdimensions
                .iter()
                .map(|subdimension| ScoreNode::new(subdimension.earned, subdimension.max))
                .sum();
            let ExclusionAssessment {
                not_applicable_ratio,
                excluded,
            } = exclusion.assess(dimension, answers);
            let progress = dimension_progress(dimension, answers);
            let percentage = score.percentage();

            if excluded {
                debug!(
                    dimension = %dimension.id,
                    not_applicable_ratio,
                    "dimension excluded from global score"
                );
                excluded_dimensions.push(dimension.id.clone());
            } else {
                global += score;
            }
            global_progress += progress;

            dimensions.push(DimensionResult {
                id: dimension.id.clone(),
                name: dimension.name.clone(),
                earned: score.earned,
                max: score.max,
                percentage,
                level: thresholds.for_dimension(&dimension.name).classify(percentage).to_string(),
                excluded,
                not_applicable_ratio,
                progress,
                subdimensions,
            });
        }

        let global_percentage = global.percentage();
        let report = MaturityReport {
            questionnaire: self.questionnaire.id().to_string(),
            dimensions,
            global: GlobalResult {
                earned: global.earned,
                max: global.max,
                percentage: global_percentage,
                level: global_table.classify(global_percentage).to_string(),
                level_policy: global_policy.to_string(),
                excluded_dimensions,
                progress: global_progress,
            },
            diagnostics: self.diagnose(answers),
        };

        debug!(
            questionnaire = %report.questionnaire,
            earned = report.global.earned,
            max = report.global.max,
            level = %report.global.level,
            "maturity evaluation complete"
        );

        Ok(report)
    }

    fn diagnose(&self, answers: &AnswerMap) -> AnswerDiagnostics {
        let mut diagnostics = AnswerDiagnostics::default();

        for (indicator_id, value) in answers.iter() {
            match self.questionnaire.indicator(indicator_id) {
                None => diagnostics.unknown_indicators.push(indicator_id.to_string()),
                Some(indicator) => {
                    if value != NOT_APPLICABLE && indicator.option(value).is_none() {
                        diagnostics.unrecognized_answers.push(UnrecognizedAnswer {
                            indicator: indicator_id.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
        }

        diagnostics.stale_answers = stale_answers(&self.questionnaire, answers);
        diagnostics
    }
}

/// Loads and validates a definition, then evaluates it with the default exclusion
/// policy and the flat global table.
pub fn evaluate(
    definition: QuestionnaireDefinition,
    answers: &AnswerMap,
    thresholds: &ClassificationThresholds,
) -> Result<MaturityReport, MaturityError> {
    let loaded = Questionnaire::load(definition)?;
    MaturityEngine::new(loaded.questionnaire).evaluate(answers, thresholds, &GlobalLevelPolicy::Flat)
}

#[derive(Debug, thiserror::Error)]
pub enum MaturityError {
    #[error("invalid questionnaire: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("invalid thresholds: {0}")]
    Thresholds(#[from] ThresholdError),
    #[error("malformed configuration document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("unknown index variant '{0}'")]
    UnknownVariant(String),
}

impl Questionnaire {
    pub fn from_json_str(raw: &str) -> Result<LoadedQuestionnaire, MaturityError> {
        let definition: QuestionnaireDefinition = serde_json::from_str(raw)?;
        Ok(Self::load(definition)?)
    }
}
