use impg_maturity::error::AppError;
use impg_maturity::maturity::{
    ExclusionBasis, GlobalLevelPolicy, IndexVariant, LoadedVariant,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<ScoringCatalog>,
}

/// Every embedded index variant, validated once at start-up.
#[derive(Debug)]
pub(crate) struct ScoringCatalog {
    variants: HashMap<IndexVariant, LoadedVariant>,
}

impl ScoringCatalog {
    pub(crate) fn load() -> Result<Self, AppError> {
        let mut variants = HashMap::new();
        for variant in IndexVariant::all() {
            let loaded = variant.load()?;
            for warning in &loaded.warnings {
                warn!(%variant, %warning, "embedded questionnaire warning");
            }
            variants.insert(variant, loaded);
        }
        Ok(Self { variants })
    }

    pub(crate) fn get(&self, variant: IndexVariant) -> Option<&LoadedVariant> {
        self.variants.get(&variant)
    }

    /// Loaded variants in a stable order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &LoadedVariant> {
        IndexVariant::all()
            .into_iter()
            .filter_map(|variant| self.variants.get(&variant))
    }
}

pub(crate) fn parse_variant(raw: &str) -> Result<IndexVariant, String> {
    raw.parse::<IndexVariant>().map_err(|err| err.to_string())
}

pub(crate) fn parse_global_policy(raw: &str) -> Result<GlobalLevelPolicy, String> {
    GlobalLevelPolicy::parse(raw)
        .ok_or_else(|| format!("'{raw}' must be 'flat' or 'dimension:<dimension name>'"))
}

pub(crate) fn parse_exclusion_basis(raw: &str) -> Result<ExclusionBasis, String> {
    ExclusionBasis::parse(raw)
        .ok_or_else(|| format!("'{raw}' must be 'indicator-count' or 'potential-points'"))
}
