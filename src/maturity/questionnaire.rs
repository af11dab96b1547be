use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// Sentinel option value that removes an indicator from every denominator above it.
pub const NOT_APPLICABLE: &str = "Not Applicable";

/// Discrete answer choice for an indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    pub points: f64,
}

impl AnswerOption {
    pub fn new(value: impl Into<String>, points: f64) -> Self {
        Self {
            value: value.into(),
            points,
        }
    }

    pub fn not_applicable() -> Self {
        Self::new(NOT_APPLICABLE, 0.0)
    }

    pub fn is_not_applicable(&self) -> bool {
        self.value == NOT_APPLICABLE
    }
}

/// Gate that makes an indicator eligible only after another indicator was answered
/// with one of the required values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub depends_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_values: Option<Vec<String>>,
}

impl Condition {
    pub fn equals(depends_on: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            depends_on: depends_on.into(),
            required_value: Some(value.into()),
            required_values: None,
        }
    }

    pub fn any_of<I, S>(depends_on: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            depends_on: depends_on.into(),
            required_value: None,
            required_values: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    /// True when neither a single value nor a value set was configured.
    pub fn is_unconstrained(&self) -> bool {
        self.required_value.is_none() && self.required_values.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Indicator {
    /// Highest points among the scorable (non Not-Applicable) options.
    pub fn max_points(&self) -> f64 {
        self.options
            .iter()
            .filter(|option| !option.is_not_applicable())
            .map(|option| option.points)
            .fold(0.0, f64::max)
    }

    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.value == value)
    }

    fn scorable_options(&self) -> usize {
        self.options
            .iter()
            .filter(|option| !option.is_not_applicable())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdimension {
    pub id: String,
    pub name: String,
    pub indicators: Vec<Indicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    pub name: String,
    pub subdimensions: Vec<Subdimension>,
}

impl Dimension {
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        self.subdimensions
            .iter()
            .flat_map(|subdimension| subdimension.indicators.iter())
    }
}

/// Raw, unvalidated questionnaire tree as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireDefinition {
    pub id: String,
    pub name: String,
    pub dimensions: Vec<Dimension>,
}

/// Validated, immutable questionnaire. Only obtainable through [`Questionnaire::load`],
/// so every instance satisfies the structural invariants the scorer relies on.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    definition: QuestionnaireDefinition,
    positions: HashMap<String, IndicatorPosition>,
}

#[derive(Debug, Clone, Copy)]
struct IndicatorPosition {
    dimension: usize,
    subdimension: usize,
    indicator: usize,
}

/// A questionnaire that passed validation, together with the non-fatal findings.
#[derive(Debug, Clone)]
pub struct LoadedQuestionnaire {
    pub questionnaire: Questionnaire,
    pub warnings: Vec<ConfigurationWarning>,
}

impl Questionnaire {
    pub fn load(definition: QuestionnaireDefinition) -> Result<LoadedQuestionnaire, ConfigurationError> {
        let positions = index_definition(&definition)?;
        validate_options(&definition)?;
        let warnings = validate_conditions(&definition, &positions)?;

        for warning in &warnings {
            warn!(questionnaire = %definition.id, %warning, "questionnaire configuration warning");
        }

        Ok(LoadedQuestionnaire {
            questionnaire: Self {
                definition,
                positions,
            },
            warnings,
        })
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.definition.dimensions
    }

    pub fn definition(&self) -> &QuestionnaireDefinition {
        &self.definition
    }

    pub fn indicator(&self, id: &str) -> Option<&Indicator> {
        locate(&self.definition, self.positions.get(id)?)
    }

    pub fn contains_indicator(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Indicators in questionnaire order.
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        self.definition
            .dimensions
            .iter()
            .flat_map(Dimension::indicators)
    }

    pub fn indicator_count(&self) -> usize {
        self.positions.len()
    }
}

fn index_definition(
    definition: &QuestionnaireDefinition,
) -> Result<HashMap<String, IndicatorPosition>, ConfigurationError> {
    if definition.dimensions.is_empty() {
        return Err(ConfigurationError::EmptyQuestionnaire(definition.id.clone()));
    }

    let mut dimension_ids = HashSet::new();
    let mut subdimension_ids = HashSet::new();
    let mut positions = HashMap::new();

    for (d, dimension) in definition.dimensions.iter().enumerate() {
        if !dimension_ids.insert(dimension.id.as_str()) {
            return Err(ConfigurationError::DuplicateId {
                kind: "dimension",
                id: dimension.id.clone(),
            });
        }
        if dimension.subdimensions.is_empty() {
            return Err(ConfigurationError::EmptyDimension(dimension.id.clone()));
        }

        for (s, subdimension) in dimension.subdimensions.iter().enumerate() {
            if !subdimension_ids.insert(subdimension.id.as_str()) {
                return Err(ConfigurationError::DuplicateId {
                    kind: "subdimension",
                    id: subdimension.id.clone(),
                });
            }
            if subdimension.indicators.is_empty() {
                return Err(ConfigurationError::EmptySubdimension(subdimension.id.clone()));
            }

            for (i, indicator) in subdimension.indicators.iter().enumerate() {
                let position = IndicatorPosition {
                    dimension: d,
                    subdimension: s,
                    indicator: i,
                };
                if positions.insert(indicator.id.clone(), position).is_some() {
                    return Err(ConfigurationError::DuplicateId {
                        kind: "indicator",
                        id: indicator.id.clone(),
                    });
                }
            }
        }
    }

    Ok(positions)
}

fn validate_options(definition: &QuestionnaireDefinition) -> Result<(), ConfigurationError> {
    for indicator in definition.dimensions.iter().flat_map(Dimension::indicators) {
        if indicator.scorable_options() == 0 {
            return Err(ConfigurationError::NoScorableOptions {
                indicator: indicator.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        for option in &indicator.options {
            if !seen.insert(option.value.as_str()) {
                return Err(ConfigurationError::DuplicateOption {
                    indicator: indicator.id.clone(),
                    value: option.value.clone(),
                });
            }
            if !option.points.is_finite() || option.points < 0.0 {
                return Err(ConfigurationError::InvalidPoints {
                    indicator: indicator.id.clone(),
                    value: option.value.clone(),
                    points: option.points,
                });
            }
            if option.is_not_applicable() && option.points != 0.0 {
                return Err(ConfigurationError::ScoredNotApplicable {
                    indicator: indicator.id.clone(),
                    points: option.points,
                });
            }
        }
    }

    Ok(())
}

fn locate<'a>(
    definition: &'a QuestionnaireDefinition,
    position: &IndicatorPosition,
) -> Option<&'a Indicator> {
    definition
        .dimensions
        .get(position.dimension)?
        .subdimensions
        .get(position.subdimension)?
        .indicators
        .get(position.indicator)
}

fn validate_conditions(
    definition: &QuestionnaireDefinition,
    positions: &HashMap<String, IndicatorPosition>,
) -> Result<Vec<ConfigurationWarning>, ConfigurationError> {
    let mut warnings = Vec::new();
    let mut dependencies: HashMap<&str, &str> = HashMap::new();

    for indicator in definition.dimensions.iter().flat_map(Dimension::indicators) {
        let Some(condition) = &indicator.condition else {
            continue;
        };

        let Some(dependency) = positions
            .get(&condition.depends_on)
            .and_then(|position| locate(definition, position))
        else {
            return Err(ConfigurationError::UnknownDependency {
                indicator: indicator.id.clone(),
                depends_on: condition.depends_on.clone(),
            });
        };

        if condition.required_value.is_none()
            && condition.required_values.as_ref().is_some_and(Vec::is_empty)
        {
            return Err(ConfigurationError::EmptyRequiredValues {
                indicator: indicator.id.clone(),
                depends_on: condition.depends_on.clone(),
            });
        }

        let required = condition
            .required_value
            .iter()
            .chain(condition.required_values.iter().flatten());
        for value in required {
            if value != NOT_APPLICABLE && dependency.option(value).is_none() {
                return Err(ConfigurationError::UnreachableRequiredValue {
                    indicator: indicator.id.clone(),
                    depends_on: condition.depends_on.clone(),
                    value: value.clone(),
                });
            }
        }

        if condition.is_unconstrained() {
            warnings.push(ConfigurationWarning::UnconstrainedCondition {
                indicator: indicator.id.clone(),
                depends_on: condition.depends_on.clone(),
            });
        }

        dependencies.insert(indicator.id.as_str(), condition.depends_on.as_str());
    }

    // Each indicator has at most one dependency, so a cycle is a revisit along a
    // single chain.
    let mut acyclic: HashSet<&str> = HashSet::new();
    for indicator in definition.dimensions.iter().flat_map(Dimension::indicators) {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = Some(indicator.id.as_str());

        while let Some(id) = current {
            if acyclic.contains(id) {
                break;
            }
            if let Some(start) = chain.iter().position(|seen| *seen == id) {
                let mut cycle: Vec<String> = chain[start..].iter().map(|id| id.to_string()).collect();
                cycle.push(id.to_string());
                return Err(ConfigurationError::CyclicDependency {
                    indicator: id.to_string(),
                    chain: cycle,
                });
            }
            chain.push(id);
            current = dependencies.get(id).copied();
        }

        acyclic.extend(chain);
    }

    Ok(warnings)
}

/// Fatal problems detected while loading a questionnaire definition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("questionnaire '{0}' defines no dimensions")]
    EmptyQuestionnaire(String),
    #[error("dimension '{0}' defines no subdimensions")]
    EmptyDimension(String),
    #[error("subdimension '{0}' defines no indicators")]
    EmptySubdimension(String),
    #[error("{kind} id '{id}' is defined more than once")]
    DuplicateId { kind: &'static str, id: String },
    #[error("indicator '{indicator}' has no scorable options besides Not Applicable")]
    NoScorableOptions { indicator: String },
    #[error("indicator '{indicator}' lists option '{value}' more than once")]
    DuplicateOption { indicator: String, value: String },
    #[error("indicator '{indicator}' option '{value}' has invalid points {points}")]
    InvalidPoints {
        indicator: String,
        value: String,
        points: f64,
    },
    #[error("indicator '{indicator}' awards {points} points for Not Applicable; it must award 0")]
    ScoredNotApplicable { indicator: String, points: f64 },
    #[error("indicator '{indicator}' depends on unknown indicator '{depends_on}'")]
    UnknownDependency {
        indicator: String,
        depends_on: String,
    },
    #[error("indicator '{indicator}' requires an empty value set from '{depends_on}' and can never be eligible")]
    EmptyRequiredValues {
        indicator: String,
        depends_on: String,
    },
    #[error("indicator '{indicator}' requires '{value}' from '{depends_on}', which offers no such option")]
    UnreachableRequiredValue {
        indicator: String,
        depends_on: String,
        value: String,
    },
    #[error("indicator '{indicator}' is part of a cyclic condition chain: {}", chain.join(" -> "))]
    CyclicDependency {
        indicator: String,
        chain: Vec<String>,
    },
}

/// Non-fatal findings surfaced alongside a loaded questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationWarning {
    UnconstrainedCondition {
        indicator: String,
        depends_on: String,
    },
}

impl fmt::Display for ConfigurationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationWarning::UnconstrainedCondition {
                indicator,
                depends_on,
            } => write!(
                f,
                "indicator '{}' depends on '{}' without a required value; the condition always holds",
                indicator, depends_on
            ),
        }
    }
}
