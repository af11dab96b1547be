use crate::maturity::{
    AnswerMap, AnswerOption, Condition, Dimension, Indicator, MaturityEngine, Questionnaire,
    QuestionnaireDefinition, Subdimension,
};

pub(super) const TOP: &str = "Optimizado";
pub(super) const PARTIAL: &str = "Implementado";
pub(super) const NONE: &str = "No existe";

/// Four-value scale topping out at 25 points, plus Not Applicable.
pub(super) fn scale() -> Vec<AnswerOption> {
    vec![
        AnswerOption::new(NONE, 0.0),
        AnswerOption::new("En desarrollo", 10.0),
        AnswerOption::new(PARTIAL, 20.0),
        AnswerOption::new(TOP, 25.0),
        AnswerOption::not_applicable(),
    ]
}

pub(super) fn indicator(id: &str) -> Indicator {
    Indicator {
        id: id.to_string(),
        prompt: format!("Indicator {id}"),
        options: scale(),
        condition: None,
    }
}

pub(super) fn gated_indicator(id: &str, condition: Condition) -> Indicator {
    Indicator {
        condition: Some(condition),
        ..indicator(id)
    }
}

pub(super) fn subdimension(id: &str, indicators: Vec<Indicator>) -> Subdimension {
    Subdimension {
        id: id.to_string(),
        name: format!("Subdimension {id}"),
        indicators,
    }
}

pub(super) fn dimension(id: &str, name: &str, subdimensions: Vec<Subdimension>) -> Dimension {
    Dimension {
        id: id.to_string(),
        name: name.to_string(),
        subdimensions,
    }
}

/// Dimension `id` with a single subdimension holding `count` plain indicators
/// named `<id>.1.1` ... `<id>.1.<count>`.
pub(super) fn flat_dimension(id: &str, count: usize) -> Dimension {
    let indicators = (1..=count)
        .map(|n| indicator(&format!("{id}.1.{n}")))
        .collect();
    dimension(id, &format!("Dimension {id}"), vec![subdimension(&format!("{id}.1"), indicators)])
}

pub(super) fn definition(dimensions: Vec<Dimension>) -> QuestionnaireDefinition {
    QuestionnaireDefinition {
        id: "fixture".to_string(),
        name: "Fixture questionnaire".to_string(),
        dimensions,
    }
}

pub(super) fn questionnaire(dimensions: Vec<Dimension>) -> Questionnaire {
    Questionnaire::load(definition(dimensions))
        .expect("fixture questionnaire is valid")
        .questionnaire
}

pub(super) fn engine(dimensions: Vec<Dimension>) -> MaturityEngine {
    MaturityEngine::new(questionnaire(dimensions))
}

pub(super) fn answers(entries: &[(&str, &str)]) -> AnswerMap {
    entries.iter().copied().collect()
}

/// Dimension A from the reference scenarios: two 25-point indicators.
pub(super) fn scenario_dimension() -> Dimension {
    flat_dimension("A", 2)
}

/// Two dimensions where B's second subdimension is gated on A.1.1 being optimal.
pub(super) fn gated_questionnaire() -> Questionnaire {
    questionnaire(vec![
        flat_dimension("A", 2),
        dimension(
            "B",
            "Dimension B",
            vec![
                subdimension("B.1", vec![indicator("B.1.1")]),
                subdimension(
                    "B.2",
                    vec![
                        gated_indicator("B.2.1", Condition::equals("A.1.1", TOP)),
                        gated_indicator(
                            "B.2.2",
                            Condition::any_of("B.2.1", [PARTIAL, TOP]),
                        ),
                    ],
                ),
            ],
        ),
    ])
}
