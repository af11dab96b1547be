use impg_maturity::maturity::{
    AnswerMap, ExclusionBasis, ExclusionPolicy, GlobalLevelPolicy, IndexVariant, LoadedVariant,
    NOT_APPLICABLE,
};

fn impgai() -> LoadedVariant {
    IndexVariant::Impgai.load().expect("embedded IMPGAI loads")
}

fn answers(entries: &[(&str, &str)]) -> AnswerMap {
    entries.iter().copied().collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn impgai_report_excludes_mostly_not_applicable_dimension() {
    let loaded = impgai();
    let answers = answers(&[
        ("A.1.1", "Optimizado"),
        ("A.1.2", "Optimizado"),
        ("A.1.3", "Optimizado"),
        ("A.2.1", "Optimizado"),
        ("A.2.2", "Optimizado"),
        ("C.1.1", NOT_APPLICABLE),
        ("C.1.2", NOT_APPLICABLE),
        ("C.1.3", "Optimizado"),
        ("C.2.1", "Optimizado"),
        ("C.2.2", "Optimizado"),
        ("D.1.1", NOT_APPLICABLE),
        ("D.1.2", "Optimizado"),
        ("D.2.1", "Sí"),
        ("D.2.2", "Optimizado"),
    ]);

    let report = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");

    let c = report.dimension("C").expect("dimension C reported");
    assert!(c.excluded, "two of five Not Applicable answers exceed a quarter");
    assert_close(c.not_applicable_ratio, 0.4);
    assert_close(c.percentage, 100.0);

    let d = report.dimension("D").expect("dimension D reported");
    assert!(!d.excluded, "exactly a quarter stays in the global score");
    assert_close(d.earned, 75.0);
    assert_close(d.max, 75.0);
    assert_eq!(d.level, "Avanzado");

    let b = report.dimension("B").expect("dimension B reported");
    assert_close(b.max, 50.0);
    assert_eq!(b.progress.answered, 0);

    assert_eq!(report.global.excluded_dimensions, vec!["C".to_string()]);
    assert_close(report.global.earned, 200.0);
    assert_close(report.global.max, 250.0);
    assert_close(report.global.percentage, 80.0);
    assert_eq!(report.global.level, "Avanzado");
    assert!(report.diagnostics.is_clean());
}

#[test]
fn dimension_specific_table_changes_the_dimension_level() {
    let loaded = impgai();
    let answers = answers(&[
        ("A.1.1", "Optimizado"),
        ("A.1.2", "En desarrollo"),
        ("A.1.3", "En desarrollo"),
        ("A.2.1", "En desarrollo"),
    ]);

    let report = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");

    let a = report.dimension("A").expect("dimension A reported");
    assert_close(a.percentage, 55.0);
    assert_eq!(a.level, "Medio", "institutional table starts Medio at 50");
    assert_eq!(loaded.thresholds.global.classify(55.0), "Inicial");

    let by_dimension = loaded
        .engine
        .evaluate(
            &answers,
            &loaded.thresholds,
            &GlobalLevelPolicy::DimensionTable("Datos y rendición de cuentas".to_string()),
        )
        .expect("table exists");
    assert_eq!(
        by_dimension.global.level_policy,
        "dimension:Datos y rendición de cuentas"
    );
    assert_eq!(by_dimension.dimensions, report.dimensions);
}

#[test]
fn changing_a_gate_answer_leaves_stale_answers_until_pruned() {
    let loaded = impgai();
    let questionnaire = loaded.engine.questionnaire();
    let mut answers = answers(&[
        ("B.1.1", "Optimizado"),
        ("B.1.2", "Implementado"),
        ("B.2.1", "Sí"),
        ("B.2.2", "Optimizado"),
    ]);

    let before = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");
    assert_close(before.dimension("B").expect("B").earned, 95.0);
    assert!(before.diagnostics.stale_answers.is_empty());

    answers.insert("B.1.1", "No existe");
    answers.insert("B.2.1", "Parcialmente");

    let changed = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");
    let b = changed.dimension("B").expect("B");
    assert_close(b.earned, 12.5);
    assert_close(b.max, 50.0);
    assert_eq!(
        changed.diagnostics.stale_answers,
        vec!["B.1.2".to_string(), "B.2.2".to_string()]
    );

    let removed = answers.prune_stale(questionnaire);
    assert_eq!(removed, vec!["B.1.2".to_string(), "B.2.2".to_string()]);
    assert!(!answers.contains("B.1.2"));

    let pruned = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");
    assert_eq!(pruned.dimensions, changed.dimensions);
    assert!(pruned.diagnostics.is_clean());
}

#[test]
fn csv_answers_score_like_json_answers() {
    let loaded = IndexVariant::Impgpp.load().expect("embedded IMPGPP loads");
    let csv = "indicator,value\nP.1.1,Implementado\nP.1.2,Optimizado\nP.2.2,Parcialmente\nQ.1.1,\n";
    let from_csv = AnswerMap::from_csv_reader(csv.as_bytes()).expect("csv parses");
    let from_json = AnswerMap::from_json_str(
        r#"{"P.1.1": "Implementado", "P.1.2": "Optimizado", "P.2.2": "Parcialmente"}"#,
    )
    .expect("json parses");

    assert_eq!(from_csv, from_json);
    assert!(!from_csv.contains("Q.1.1"), "blank values are unanswered");

    let report = loaded
        .engine
        .evaluate(&from_csv, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");
    let p = report.dimension("P").expect("P");
    assert_close(p.earned, 57.5);
    assert_close(p.max, 100.0);
    assert_eq!(p.progress.answered, 3);
    assert_eq!(p.progress.eligible, 4);
}

#[test]
fn exclusion_bases_agree_when_indicators_carry_equal_points() {
    let loaded = impgai();
    let answers = answers(&[("B.1.1", "Implementado"), ("B.2.1", NOT_APPLICABLE)]);

    let by_count = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");
    let by_points = loaded
        .engine
        .evaluate_with(
            &answers,
            &loaded.thresholds,
            &GlobalLevelPolicy::Flat,
            &ExclusionPolicy::with_basis(ExclusionBasis::PotentialPoints),
        )
        .expect("evaluation succeeds");

    let count_b = by_count.dimension("B").expect("B");
    let points_b = by_points.dimension("B").expect("B");
    assert_close(count_b.not_applicable_ratio, 0.25);
    assert_close(points_b.not_applicable_ratio, 0.25);
    assert!(!count_b.excluded);
    assert!(!points_b.excluded);
    assert_eq!(by_count.global, by_points.global);
}

#[test]
fn repeated_evaluation_is_identical() {
    let loaded = IndexVariant::Impgpp.load().expect("embedded IMPGPP loads");
    let answers = answers(&[
        ("R.1.1", "Implementado"),
        ("R.1.2", NOT_APPLICABLE),
        ("R.2.1", "En desarrollo"),
        ("X.9.9", "Optimizado"),
    ]);

    let first = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");
    let second = loaded
        .engine
        .evaluate(&answers, &loaded.thresholds, &GlobalLevelPolicy::Flat)
        .expect("evaluation succeeds");

    assert_eq!(first, second);
    assert_eq!(first.diagnostics.unknown_indicators, vec!["X.9.9".to_string()]);
}
