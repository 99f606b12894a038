//! Core types for promotion evaluation.
//!
//! These types model the full lifecycle:
//! Roster → Eligibility → Approver → Citations → Outcome.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::ApproverError;

// ═══════════════════════════════════════════
// Roster records (from RecordProvider)
// ═══════════════════════════════════════════

/// An active member as supplied by the record provider.
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Roster (personnel file) id.
    pub id: u64,
    /// Account id used to look up history and awards.
    pub user_id: u64,
    pub display_name: String,
    pub username: String,
    /// Free-text billet, e.g. "Squad Leader 1/A/1-7".
    pub position: String,
    /// `None` when the roster carries no readable promotion date. Only the
    /// member being evaluated needs one.
    pub last_promotion: Option<NaiveDateTime>,
}

/// One service record line. Order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub details: String,
}

/// One award line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEntry {
    pub details: String,
}

impl HistoryEntry {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

impl AwardEntry {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

// ═══════════════════════════════════════════
// Eligibility
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EligibilityResult {
    Eligible,
    /// Time-in-grade not met. `eligible_on` uses the 30-day month approximation.
    TimeInGradeNotMet {
        required_months: u32,
        actual_months: i32,
        eligible_on: NaiveDate,
    },
    QualificationNotMet,
}

impl EligibilityResult {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

impl std::fmt::Display for EligibilityResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eligible => write!(f, "eligible"),
            Self::TimeInGradeNotMet {
                required_months,
                actual_months,
                eligible_on,
            } => write!(
                f,
                "time in grade not met: required {required_months} months, current {actual_months} months, eligible {eligible_on}"
            ),
            Self::QualificationNotMet => write!(f, "qualification not met"),
        }
    }
}

// ═══════════════════════════════════════════
// Approver
// ═══════════════════════════════════════════

/// Result of approver resolution as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ApproverStatus {
    /// Literal authority or "{displayName} | @{username}".
    Resolved(String),
    /// The position string carries no company/battalion designation.
    Undefined,
    /// Nobody holds the required billet.
    BilletNotFound(String),
}

impl From<Result<String, ApproverError>> for ApproverStatus {
    fn from(result: Result<String, ApproverError>) -> Self {
        match result {
            Ok(name) => Self::Resolved(name),
            Err(ApproverError::Undefined(_)) => Self::Undefined,
            Err(ApproverError::BilletNotFound(billet)) => Self::BilletNotFound(billet),
        }
    }
}

impl std::fmt::Display for ApproverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(name) => write!(f, "{name}"),
            Self::Undefined => write!(f, "undefined"),
            Self::BilletNotFound(billet) => write!(f, "not found ({billet})"),
        }
    }
}

// ═══════════════════════════════════════════
// Citations & outcome
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationKind {
    Primary,
    Ribbon,
}

impl CitationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Ribbon => "ribbon",
        }
    }
}

/// A citation that could not be rendered. Fatal for that citation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationFailure {
    pub kind: CitationKind,
    pub message: String,
}

/// What happened to the secondary ribbon citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RibbonDecision {
    NotRequired,
    AlreadyAwarded,
    Generated,
    Failed,
}

/// Evaluation states. Transitions are strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionState {
    Start,
    TimeInGradeCheck,
    QualificationCheck,
    ApproverResolution,
    PrimaryCitation,
    RibbonCitation,
    Done,
    RejectedTimeInGrade,
    RejectedQualification,
}

impl PromotionState {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RejectedTimeInGrade | Self::RejectedQualification)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PromotionOutcome {
    pub candidate_id: u64,
    pub rank: String,
    pub eligibility: EligibilityResult,
    /// `None` when evaluation stopped before approver resolution.
    pub approver: Option<ApproverStatus>,
    pub artifact_paths: Vec<PathBuf>,
    pub citation_failures: Vec<CitationFailure>,
    pub ribbon: Option<RibbonDecision>,
    pub state: PromotionState,
}

impl PromotionOutcome {
    pub(crate) fn rejected(
        candidate_id: u64,
        rank: &str,
        eligibility: EligibilityResult,
        state: PromotionState,
    ) -> Self {
        Self {
            candidate_id,
            rank: rank.to_string(),
            eligibility,
            approver: None,
            artifact_paths: vec![],
            citation_failures: vec![],
            ribbon: None,
            state,
        }
    }
}
