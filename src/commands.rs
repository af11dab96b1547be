use crate::cli::{EvaluateArgs, SourceArgs, StaleArgs};
use impg_maturity::config::AppConfig;
use impg_maturity::error::AppError;
use impg_maturity::maturity::{
    AnswerMap, ClassificationThresholds, ConfigurationWarning, ExclusionPolicy, MaturityEngine,
    MaturityError, MaturityReport, Questionnaire,
};
use std::path::Path;
use tracing::info;

/// Questionnaire and thresholds resolved from CLI flags.
struct ScoringSource {
    label: String,
    engine: MaturityEngine,
    thresholds: ClassificationThresholds,
    warnings: Vec<ConfigurationWarning>,
}

fn load_source(config: &AppConfig, args: SourceArgs) -> Result<ScoringSource, AppError> {
    let SourceArgs {
        variant,
        questionnaire,
        thresholds,
    } = args;

    let mut source = match questionnaire {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let loaded = Questionnaire::from_json_str(&raw)?;
            ScoringSource {
                label: path.display().to_string(),
                engine: MaturityEngine::new(loaded.questionnaire),
                thresholds: ClassificationThresholds::flat(),
                warnings: loaded.warnings,
            }
        }
        None => {
            let variant = variant.unwrap_or(config.scoring.default_variant);
            let loaded = variant.load()?;
            ScoringSource {
                label: variant.to_string(),
                engine: loaded.engine,
                thresholds: loaded.thresholds,
                warnings: loaded.warnings,
            }
        }
    };

    if let Some(path) = thresholds {
        source.thresholds = load_thresholds(&path)?;
    }

    Ok(source)
}

fn load_thresholds(path: &Path) -> Result<ClassificationThresholds, AppError> {
    let raw = std::fs::read_to_string(path)?;
    ClassificationThresholds::from_json_str(&raw)
        .map_err(|err| AppError::Maturity(MaturityError::from(err)))
}

pub(crate) fn run_evaluate(config: &AppConfig, args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        source,
        answers,
        global_policy,
        exclusion_basis,
        json,
    } = args;

    let source = load_source(config, source)?;
    let answer_map = AnswerMap::from_path(&answers)?;
    let exclusion = ExclusionPolicy::with_basis(exclusion_basis);

    let report = source.engine.evaluate_with(
        &answer_map,
        &source.thresholds,
        &global_policy,
        &exclusion,
    )?;

    info!(
        source = %source.label,
        answers = answer_map.len(),
        level = %report.global.level,
        "questionnaire evaluated"
    );

    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(MaturityError::from)?;
        println!("{rendered}");
    } else {
        render_report(&source.label, &report);
    }

    Ok(())
}

pub(crate) fn run_validate(config: &AppConfig, args: SourceArgs) -> Result<(), AppError> {
    let source = load_source(config, args)?;
    let questionnaire = source.engine.questionnaire();

    println!("Questionnaire: {} ({})", questionnaire.name(), source.label);
    println!(
        "Dimensions: {} | Indicators: {}",
        questionnaire.dimensions().len(),
        questionnaire.indicator_count()
    );

    for dimension in questionnaire.dimensions() {
        let bands = source
            .thresholds
            .for_dimension(&dimension.name)
            .bands()
            .iter()
            .map(|band| format!("{} {:.2}-{:.2}", band.level, band.min, band.max))
            .collect::<Vec<_>>()
            .join(", ");
        println!("- {} {}: {}", dimension.id, dimension.name, bands);
    }

    if source.warnings.is_empty() {
        println!("No warnings.");
    } else {
        println!("Warnings:");
        for warning in &source.warnings {
            println!("- {warning}");
        }
    }

    Ok(())
}

pub(crate) fn run_stale(config: &AppConfig, args: StaleArgs) -> Result<(), AppError> {
    let StaleArgs {
        source,
        answers,
        output,
    } = args;

    let source = load_source(config, source)?;
    let mut answer_map = AnswerMap::from_path(&answers)?;
    let stale = answer_map.prune_stale(source.engine.questionnaire());

    if stale.is_empty() {
        println!("No stale answers in {}.", answers.display());
    } else {
        println!("Stale answers ({}):", stale.len());
        for indicator in &stale {
            println!("- {indicator}");
        }
    }

    match output {
        Some(path) => {
            answer_map.to_path(&path)?;
            info!(path = %path.display(), removed = stale.len(), "pruned answers saved");
            println!("{} answers saved to {}.", answer_map.len(), path.display());
        }
        None if !stale.is_empty() => println!(
            "{} answers would remain after pruning; pass --output to save them.",
            answer_map.len()
        ),
        None => {}
    }

    Ok(())
}

fn render_report(label: &str, report: &MaturityReport) {
    println!("Maturity report: {} ({label})", report.questionnaire);
    println!(
        "Global: {:.2}/{:.2} ({:.2}%) -> {} [table: {}]",
        report.global.earned,
        report.global.max,
        report.global.percentage,
        report.global.level,
        report.global.level_policy
    );
    println!(
        "Answered {} of {} eligible indicators",
        report.global.progress.answered, report.global.progress.eligible
    );

    println!("\nDimensions:");
    for dimension in &report.dimensions {
        let marker = if dimension.excluded {
            format!(
                " [excluded: {:.0}% Not Applicable]",
                dimension.not_applicable_ratio * 100.0
            )
        } else {
            String::new()
        };
        println!(
            "- {} {}: {:.2}/{:.2} ({:.2}%) -> {}{}",
            dimension.id,
            dimension.name,
            dimension.earned,
            dimension.max,
            dimension.percentage,
            dimension.level,
            marker
        );
        for subdimension in &dimension.subdimensions {
            println!(
                "    {} {}: {:.2}/{:.2} ({:.2}%)",
                subdimension.id,
                subdimension.name,
                subdimension.earned,
                subdimension.max,
                subdimension.percentage
            );
        }
    }

    let diagnostics = &report.diagnostics;
    if diagnostics.is_clean() {
        return;
    }

    println!("\nAnswer diagnostics:");
    for indicator in &diagnostics.unknown_indicators {
        println!("- unknown indicator {indicator}");
    }
    for answer in &diagnostics.unrecognized_answers {
        println!(
            "- {} has unrecognized value '{}' (scored as unanswered)",
            answer.indicator, answer.value
        );
    }
    for indicator in &diagnostics.stale_answers {
        println!("- {indicator} is answered but not currently eligible");
    }
}
