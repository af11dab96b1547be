//! Embedded questionnaire and threshold configuration for each index variant.

use super::levels::ClassificationThresholds;
use super::questionnaire::{ConfigurationWarning, LoadedQuestionnaire, Questionnaire};
use super::{MaturityEngine, MaturityError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const IMPGAI_QUESTIONNAIRE: &str = include_str!("../../data/impgai/questionnaire.json");
const IMPGAI_THRESHOLDS: &str = include_str!("../../data/impgai/thresholds.json");
const IMPGPP_QUESTIONNAIRE: &str = include_str!("../../data/impgpp/questionnaire.json");
const IMPGPP_THRESHOLDS: &str = include_str!("../../data/impgpp/thresholds.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexVariant {
    Impgai,
    Impgpp,
}

impl IndexVariant {
    pub fn all() -> [IndexVariant; 2] {
        [IndexVariant::Impgai, IndexVariant::Impgpp]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            IndexVariant::Impgai => "impgai",
            IndexVariant::Impgpp => "impgpp",
        }
    }

    pub fn questionnaire(&self) -> Result<LoadedQuestionnaire, MaturityError> {
        let raw = match self {
            IndexVariant::Impgai => IMPGAI_QUESTIONNAIRE,
            IndexVariant::Impgpp => IMPGPP_QUESTIONNAIRE,
        };
        Questionnaire::from_json_str(raw)
    }

    pub fn thresholds(&self) -> Result<ClassificationThresholds, MaturityError> {
        let raw = match self {
            IndexVariant::Impgai => IMPGAI_THRESHOLDS,
            IndexVariant::Impgpp => IMPGPP_THRESHOLDS,
        };
        Ok(ClassificationThresholds::from_json_str(raw)?)
    }

    /// Questionnaire and thresholds ready for evaluation.
    pub fn load(&self) -> Result<LoadedVariant, MaturityError> {
        let loaded = self.questionnaire()?;
        Ok(LoadedVariant {
            variant: *self,
            engine: MaturityEngine::new(loaded.questionnaire),
            thresholds: self.thresholds()?,
            warnings: loaded.warnings,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LoadedVariant {
    pub variant: IndexVariant,
    pub engine: MaturityEngine,
    pub thresholds: ClassificationThresholds,
    pub warnings: Vec<ConfigurationWarning>,
}

impl fmt::Display for IndexVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for IndexVariant {
    type Err = MaturityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "impgai" => Ok(IndexVariant::Impgai),
            "impgpp" => Ok(IndexVariant::Impgpp),
            other => Err(MaturityError::UnknownVariant(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_embedded_variant_loads_without_warnings() {
        for variant in IndexVariant::all() {
            let loaded = variant
                .questionnaire()
                .unwrap_or_else(|err| panic!("{variant} questionnaire invalid: {err}"));
            assert!(loaded.warnings.is_empty(), "{variant}: {:?}", loaded.warnings);
            assert_eq!(loaded.questionnaire.id(), variant.slug());

            variant
                .thresholds()
                .unwrap_or_else(|err| panic!("{variant} thresholds invalid: {err}"));
        }
    }

    #[test]
    fn dimension_tables_name_existing_dimensions() {
        for variant in IndexVariant::all() {
            let questionnaire = variant.questionnaire().expect("loads").questionnaire;
            let thresholds = variant.thresholds().expect("loads");
            for name in thresholds.dimensions.keys() {
                assert!(
                    questionnaire.dimensions().iter().any(|dimension| &dimension.name == name),
                    "{variant}: threshold table '{name}' matches no dimension"
                );
            }
        }
    }

    #[test]
    fn loaded_variant_scores_empty_answers_as_zero() {
        let loaded = IndexVariant::Impgpp.load().expect("variant loads");

        let report = loaded
            .engine
            .evaluate(&Default::default(), &loaded.thresholds, &Default::default())
            .expect("evaluation succeeds");

        assert_eq!(report.global.earned, 0.0);
        assert!(report.global.max > 0.0);
        assert_eq!(report.global.level, "Inicial");
    }

    #[test]
    fn parses_variant_names() {
        assert_eq!("IMPGAI".parse::<IndexVariant>().ok(), Some(IndexVariant::Impgai));
        assert!(matches!(
            "impgxx".parse::<IndexVariant>(),
            Err(MaturityError::UnknownVariant(name)) if name == "impgxx"
        ));
    }
}
