use super::common::*;
use crate::maturity::{
    evaluate, ClassificationThresholds, GlobalLevelPolicy, Progress, UnrecognizedAnswer,
    NOT_APPLICABLE,
};

#[test]
fn evaluation_is_idempotent() {
    let engine = engine(vec![flat_dimension("A", 3), flat_dimension("B", 2)]);
    let answers = answers(&[("A.1.1", TOP), ("A.1.2", NOT_APPLICABLE), ("B.1.1", "En desarrollo")]);
    let thresholds = ClassificationThresholds::flat();

    let first = engine
        .evaluate(&answers, &thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");
    let second = engine
        .evaluate(&answers, &thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");

    assert_eq!(
        serde_json::to_string(&first).expect("report serializes"),
        serde_json::to_string(&second).expect("report serializes")
    );
}

#[test]
fn report_carries_subdimension_breakdown() {
    let questionnaire = gated_questionnaire();
    let engine = crate::maturity::MaturityEngine::new(questionnaire);
    let answers = answers(&[("A.1.1", TOP), ("B.1.1", PARTIAL), ("B.2.1", TOP)]);

    let report = engine
        .evaluate(&answers, &ClassificationThresholds::flat(), &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");

    let b = report.dimension("B").expect("dimension B reported");
    assert_eq!(b.subdimensions.len(), 2);
    assert_eq!(b.subdimensions[0].earned, 20.0);
    assert_eq!(b.subdimensions[1].earned, 25.0);
    assert_eq!(b.subdimensions[1].max, 50.0);
    assert_eq!(b.subdimensions[1].percentage, 50.0);
    assert_eq!(b.earned, 45.0);
    assert_eq!(b.max, 75.0);
}

#[test]
fn progress_counts_eligible_and_answered_indicators() {
    let engine = crate::maturity::MaturityEngine::new(gated_questionnaire());
    let answers = answers(&[
        ("A.1.1", TOP),
        ("A.1.2", NOT_APPLICABLE),
        ("B.1.1", "not an option"),
    ]);

    let report = engine
        .evaluate(&answers, &ClassificationThresholds::flat(), &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");

    assert_eq!(
        report.dimension("A").map(|a| a.progress),
        Some(Progress {
            eligible: 2,
            answered: 2
        })
    );
    // B.2.1 is open, B.2.2 still gated, B.1.1 holds an unknown value.
    assert_eq!(
        report.dimension("B").map(|b| b.progress),
        Some(Progress {
            eligible: 2,
            answered: 0
        })
    );
    assert_eq!(
        report.global.progress,
        Progress {
            eligible: 4,
            answered: 2
        }
    );
}

#[test]
fn diagnostics_list_unusable_answers() {
    let engine = crate::maturity::MaturityEngine::new(gated_questionnaire());
    let answers = answers(&[
        ("A.1.1", PARTIAL),
        ("A.1.2", "Tal vez"),
        ("B.2.1", TOP),
        ("Z.1.1", TOP),
    ]);

    let report = engine
        .evaluate(&answers, &ClassificationThresholds::flat(), &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");

    assert_eq!(report.diagnostics.unknown_indicators, vec!["Z.1.1".to_string()]);
    assert_eq!(
        report.diagnostics.unrecognized_answers,
        vec![UnrecognizedAnswer {
            indicator: "A.1.2".to_string(),
            value: "Tal vez".to_string(),
        }]
    );
    assert_eq!(report.diagnostics.stale_answers, vec!["B.2.1".to_string()]);
    assert!(!report.diagnostics.is_clean());
}

#[test]
fn one_shot_evaluate_validates_before_scoring() {
    let broken = definition(vec![dimension(
        "A",
        "Dimension A",
        vec![subdimension(
            "A.1",
            vec![gated_indicator(
                "A.1.1",
                crate::maturity::Condition::equals("missing", TOP),
            )],
        )],
    )]);

    let err = evaluate(broken, &answers(&[]), &ClassificationThresholds::flat())
        .expect_err("invalid definition is never scored");

    assert!(err.to_string().contains("A.1.1"));
}

#[test]
fn one_shot_evaluate_scores_valid_definition() {
    let report = evaluate(
        definition(vec![scenario_dimension()]),
        &answers(&[("A.1.1", TOP), ("A.1.2", NOT_APPLICABLE)]),
        &ClassificationThresholds::flat(),
    )
    .expect("evaluation succeeds");

    let dimension = &report.dimensions[0];
    assert_eq!(dimension.earned, 25.0);
    assert_eq!(dimension.max, 25.0);
    assert_eq!(dimension.percentage, 100.0);
    assert!(dimension.excluded, "one of two Not Applicable exceeds a quarter");

    // Every dimension excluded leaves an empty global score.
    assert_eq!(report.global.max, 0.0);
    assert_eq!(report.global.percentage, 0.0);
    assert_eq!(report.global.level, "Inicial");
    assert_eq!(report.global.excluded_dimensions, vec!["A".to_string()]);
    assert!(report.diagnostics.is_clean());
}
