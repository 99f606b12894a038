//! Command line surface: one promotion evaluation per invocation.
//!
//! ```text
//! promocite 258 SGT 17-Mar-2020 --settings ./promocite.json
//! promocite 258 SGT 2020-03-17 --snapshot roster.json --json
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use thiserror::Error;

use crate::citation::{CitationPaths, FsArtifactSink, ImageCitationRenderer, OutputFormat};
use crate::config::{ConfigError, Settings, DEFAULT_SETTINGS_FILE};
use crate::promotion::{
    EligibilityResult, PromotionError, PromotionOrchestrator, PromotionOutcome, RecordProvider,
    RuleConfig,
};
use crate::records::{ApiRecordProvider, SnapshotRecordProvider};

/// Evaluate a rank promotion and render its citations
#[derive(Parser, Debug)]
#[command(name = "promocite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Roster id of the member being promoted
    pub milpac_id: u64,

    /// Rank short code, e.g. SGT
    pub rank: String,

    /// Promotion date, YYYY-MM-DD or DD-Mon-YYYY (e.g. 17-Mar-2020)
    #[arg(value_parser = parse_effective_date)]
    pub date: NaiveDate,

    /// Path to settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Read the roster from a JSON snapshot instead of the personnel API
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Promotion(#[from] PromotionError),

    #[error("No record source: pass --snapshot or configure \"api\" in {0}")]
    NoRecordSource(PathBuf),

    #[error("Cannot serialize outcome: {0}")]
    Output(#[from] serde_json::Error),
}

/// Accepts ISO dates and the personnel office's `DD-Mon-YYYY` form.
pub fn parse_effective_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%b-%Y"))
        .map_err(|_| format!("'{raw}' is not a date (expected YYYY-MM-DD or DD-Mon-YYYY)"))
}

pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let settings = if cli.settings.exists() {
        Settings::load(&cli.settings)?
    } else {
        tracing::warn!(
            path = %cli.settings.display(),
            "Settings file not found, using defaults"
        );
        Settings::default()
    };
    let rules = RuleConfig::load(&settings.rules_path)?;

    let provider: Box<dyn RecordProvider> = match (&cli.snapshot, &settings.api) {
        (Some(path), _) => {
            Box::new(SnapshotRecordProvider::load(path).map_err(PromotionError::from)?)
        }
        (None, Some(api)) => Box::new(ApiRecordProvider::from_settings(api)?),
        (None, None) => return Err(CliError::NoRecordSource(cli.settings.clone())),
    };

    let renderer = ImageCitationRenderer::new(
        &settings.fonts_dir,
        OutputFormat::from_extension(&settings.output_extension, settings.jpeg_quality),
    );
    let orchestrator = PromotionOrchestrator::new(
        provider,
        rules,
        Box::new(renderer),
        Box::new(FsArtifactSink::new()),
        CitationPaths::from_settings(&settings),
    );

    let outcome = orchestrator.evaluate_and_render(cli.milpac_id, &cli.rank, cli.date)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", report(&outcome));
    }
    Ok(())
}

/// Human-readable summary of an outcome.
pub fn report(outcome: &PromotionOutcome) -> String {
    let mut out = String::new();
    match &outcome.eligibility {
        EligibilityResult::TimeInGradeNotMet {
            required_months,
            actual_months,
            eligible_on,
        } => {
            let _ = writeln!(
                out,
                "Time in grade not met: required {required_months} months, current {actual_months} months, eligible {eligible_on}"
            );
            return out;
        }
        EligibilityResult::QualificationNotMet => {
            let _ = writeln!(out, "Member does not meet qualification course requirements.");
            return out;
        }
        EligibilityResult::Eligible => {}
    }

    for path in &outcome.artifact_paths {
        let _ = writeln!(out, "{} Generated", path.display());
    }
    for failure in &outcome.citation_failures {
        let _ = writeln!(
            out,
            "{} citation failed: {}",
            failure.kind.as_str(),
            failure.message
        );
    }
    if let Some(approver) = &outcome.approver {
        let _ = writeln!(out, "Approver: {approver}");
    }
    out
}
