use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use impg_maturity::error::AppError;
use impg_maturity::maturity::{
    AnswerMap, ClassificationThresholds, ConfigurationWarning, ExclusionBasis, ExclusionPolicy,
    GlobalLevelPolicy, IndexVariant, LoadedVariant, MaturityReport, QuestionnaireDefinition,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    pub(crate) answers: AnswerMap,
    #[serde(default)]
    pub(crate) global_policy: Option<GlobalLevelPolicy>,
    #[serde(default)]
    pub(crate) exclusion_basis: Option<ExclusionBasis>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluateResponse {
    pub(crate) variant: IndexVariant,
    pub(crate) evaluated_at: DateTime<Utc>,
    pub(crate) report: MaturityReport,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionnaireSummary {
    pub(crate) variant: IndexVariant,
    pub(crate) name: String,
    pub(crate) dimensions: usize,
    pub(crate) indicators: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionnaireResponse {
    pub(crate) variant: IndexVariant,
    pub(crate) questionnaire: QuestionnaireDefinition,
    pub(crate) thresholds: ClassificationThresholds,
    pub(crate) warnings: Vec<ConfigurationWarning>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/questionnaires", get(list_questionnaires))
        .route("/api/v1/questionnaires/{variant}", get(questionnaire_endpoint))
        .route(
            "/api/v1/questionnaires/{variant}/evaluate",
            post(evaluate_endpoint),
        )
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_questionnaires(
    Extension(state): Extension<AppState>,
) -> Json<Vec<QuestionnaireSummary>> {
    let summaries = state
        .catalog
        .iter()
        .map(|loaded| {
            let questionnaire = loaded.engine.questionnaire();
            QuestionnaireSummary {
                variant: loaded.variant,
                name: questionnaire.name().to_string(),
                dimensions: questionnaire.dimensions().len(),
                indicators: questionnaire.indicator_count(),
            }
        })
        .collect();

    Json(summaries)
}

pub(crate) async fn questionnaire_endpoint(
    Extension(state): Extension<AppState>,
    Path(variant): Path<String>,
) -> Result<Json<QuestionnaireResponse>, AppError> {
    let loaded = resolve_variant(&state, &variant)?;

    Ok(Json(QuestionnaireResponse {
        variant: loaded.variant,
        questionnaire: loaded.engine.questionnaire().definition().clone(),
        thresholds: loaded.thresholds.clone(),
        warnings: loaded.warnings.clone(),
    }))
}

pub(crate) async fn evaluate_endpoint(
    Extension(state): Extension<AppState>,
    Path(variant): Path<String>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let loaded = resolve_variant(&state, &variant)?;
    let EvaluateRequest {
        answers,
        global_policy,
        exclusion_basis,
    } = payload;

    let global_policy = global_policy.unwrap_or_default();
    let exclusion = exclusion_basis
        .map(ExclusionPolicy::with_basis)
        .unwrap_or(*loaded.engine.exclusion_policy());

    let report =
        loaded
            .engine
            .evaluate_with(&answers, &loaded.thresholds, &global_policy, &exclusion)?;

    info!(
        variant = %loaded.variant,
        answers = answers.len(),
        level = %report.global.level,
        "questionnaire evaluated"
    );

    Ok(Json(EvaluateResponse {
        variant: loaded.variant,
        evaluated_at: Utc::now(),
        report,
    }))
}

fn resolve_variant<'a>(state: &'a AppState, raw: &str) -> Result<&'a LoadedVariant, AppError> {
    raw.parse::<IndexVariant>()
        .ok()
        .and_then(|variant| state.catalog.get(variant))
        .ok_or_else(|| AppError::UnknownVariant(raw.to_string()))
}
