use crate::commands::{run_evaluate, run_stale, run_validate};
use crate::infra::{parse_exclusion_basis, parse_global_policy, parse_variant};
use crate::server;
use clap::{Args, Parser, Subcommand};
use impg_maturity::config::AppConfig;
use impg_maturity::error::AppError;
use impg_maturity::maturity::{ExclusionBasis, GlobalLevelPolicy, IndexVariant};
use impg_maturity::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "IMPG Maturity",
    about = "Score IMPGAI/IMPGPP gender-perspective maturity questionnaires",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an answer file and print the maturity report
    Evaluate(EvaluateArgs),
    /// Load a questionnaire definition and report configuration problems
    Validate(SourceArgs),
    /// List stored answers that belong to currently ineligible indicators
    Stale(StaleArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

/// Where the questionnaire and thresholds come from.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Embedded index variant (impgai, impgpp). Defaults to APP_INDEX_VARIANT.
    #[arg(long, value_parser = parse_variant, conflicts_with = "questionnaire")]
    pub(crate) variant: Option<IndexVariant>,
    /// Questionnaire definition JSON file used instead of an embedded variant
    #[arg(long)]
    pub(crate) questionnaire: Option<PathBuf>,
    /// Threshold JSON file; defaults to the variant's tables or the flat table
    #[arg(long)]
    pub(crate) thresholds: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Answers as a JSON object or an `indicator,value` CSV file
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Global level table: `flat` or `dimension:<dimension name>`
    #[arg(long, value_parser = parse_global_policy, default_value = "flat")]
    pub(crate) global_policy: GlobalLevelPolicy,
    /// Not Applicable exclusion basis: `indicator-count` or `potential-points`
    #[arg(long, value_parser = parse_exclusion_basis, default_value = "indicator-count")]
    pub(crate) exclusion_basis: ExclusionBasis,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct StaleArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Answers as a JSON object or an `indicator,value` CSV file
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Save the pruned answers here (CSV when the extension is `.csv`, JSON otherwise)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Evaluate(args) => run_evaluate(&config, args),
        Command::Validate(args) => run_validate(&config, args),
        Command::Stale(args) => run_stale(&config, args),
    }
}
