//! Sequences a single promotion evaluation.
//!
//! ```text
//! Start → TimeInGradeCheck → QualificationCheck → ApproverResolution
//!       → PrimaryCitation → RibbonCitation (conditional) → Done
//! ```
//!
//! Rejections short-circuit before any citation is produced. Approver
//! resolution is informational and never blocks citations. Each call works on
//! its own roster snapshot; nothing is shared between evaluations.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::approver;
use super::eligibility::check_time_in_grade;
use super::error::{PromotionError, ProviderError};
use super::qualification::{check_qualification, SubstringQualificationDetector};
use super::rules::{CitationLayout, RankDefinition, RuleConfig, DATE_FIELD, NAME_FIELD};
use super::traits::*;
use super::types::*;
use crate::citation::date_format::format_date_token;
use crate::citation::paths::CitationPaths;

/// True when an award line already records this rank's promotion ribbon.
/// Case-sensitive match on the raw award text.
pub fn has_ribbon_award(awards: &[AwardEntry], long_name: &str) -> bool {
    let marker = format!("{long_name} Promotion");
    awards.iter().any(|a| a.details.contains(&marker))
}

/// A citation whose configuration has been checked before any side effects.
struct CitationPlan<'a> {
    kind: CitationKind,
    template: PathBuf,
    layout: &'a CitationLayout,
    date_template: &'a str,
}

/// Orchestrates eligibility, approver resolution and citation generation.
pub struct PromotionOrchestrator {
    provider: Box<dyn RecordProvider>,
    rules: RuleConfig,
    detector: Box<dyn QualificationDetector>,
    renderer: Box<dyn CitationRenderer>,
    sink: Box<dyn ArtifactSink>,
    paths: CitationPaths,
}

impl PromotionOrchestrator {
    /// The qualification detector defaults to substring matching on the
    /// course names configured in `rules`.
    pub fn new(
        provider: Box<dyn RecordProvider>,
        rules: RuleConfig,
        renderer: Box<dyn CitationRenderer>,
        sink: Box<dyn ArtifactSink>,
        paths: CitationPaths,
    ) -> Self {
        let detector = SubstringQualificationDetector::new(&rules.qualification.courses);
        Self {
            provider,
            rules,
            detector: Box::new(detector),
            renderer,
            sink,
            paths,
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn QualificationDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Evaluate promoting `candidate_id` to `rank_short` on `effective_date`
    /// and render the resulting citations.
    pub fn evaluate_and_render(
        &self,
        candidate_id: u64,
        rank_short: &str,
        effective_date: NaiveDate,
    ) -> Result<PromotionOutcome, PromotionError> {
        enter(PromotionState::Start, candidate_id, rank_short);

        // Configuration is checked before touching the provider or the sink.
        let rank = self
            .rules
            .rank(rank_short)
            .ok_or_else(|| PromotionError::UnknownRank(rank_short.to_string()))?;
        let primary_plan = self.plan_primary(rank)?;
        let ribbon_plan = self.plan_ribbon(rank)?;

        let roster = self.provider.fetch_active_members()?;
        let candidate = roster
            .iter()
            .find(|m| m.id == candidate_id)
            .ok_or(PromotionError::MemberNotFound(candidate_id))?;
        let last_promotion = candidate
            .last_promotion
            .ok_or_else(|| ProviderError::Decode {
                endpoint: "roster".into(),
                message: format!("member {candidate_id} has no readable promotion_date"),
            })?;

        enter(PromotionState::TimeInGradeCheck, candidate_id, rank_short);
        let eligibility = check_time_in_grade(last_promotion, rank, effective_date);
        if let EligibilityResult::TimeInGradeNotMet {
            required_months,
            actual_months,
            eligible_on,
        } = &eligibility
        {
            info!(
                candidate_id,
                rank = rank_short,
                required_months,
                actual_months,
                eligible_on = %eligible_on,
                "Promotion rejected: time in grade"
            );
            return Ok(PromotionOutcome::rejected(
                candidate_id,
                rank_short,
                eligibility,
                PromotionState::RejectedTimeInGrade,
            ));
        }

        enter(PromotionState::QualificationCheck, candidate_id, rank_short);
        if rank.requires_qualification_check {
            let history = self.provider.fetch_history(candidate.user_id)?;
            if check_qualification(&history, rank, self.detector.as_ref()) == Some(false) {
                info!(
                    candidate_id,
                    rank = rank_short,
                    entries = history.len(),
                    "Promotion rejected: qualification not met"
                );
                return Ok(PromotionOutcome::rejected(
                    candidate_id,
                    rank_short,
                    EligibilityResult::QualificationNotMet,
                    PromotionState::RejectedQualification,
                ));
            }
        }

        // Every provider read happens before the first sink write.
        let ribbon_awarded = match ribbon_plan {
            Some(_) => {
                let awards = self.provider.fetch_awards(candidate.user_id)?;
                has_ribbon_award(&awards, &rank.long_name)
            }
            None => false,
        };

        enter(PromotionState::ApproverResolution, candidate_id, rank_short);
        let approver = ApproverStatus::from(approver::resolve(candidate, rank, &roster));
        match &approver {
            ApproverStatus::Resolved(name) => debug!(approver = %name, "Approver resolved"),
            ApproverStatus::Undefined => warn!(
                candidate_id,
                position = %candidate.position,
                "Approver undefined: position has no unit designation"
            ),
            ApproverStatus::BilletNotFound(billet) => warn!(
                candidate_id,
                billet = %billet,
                "Approver not found: billet vacant"
            ),
        }

        let mut outcome = PromotionOutcome {
            candidate_id,
            rank: rank_short.to_string(),
            eligibility: EligibilityResult::Eligible,
            approver: Some(approver),
            artifact_paths: vec![],
            citation_failures: vec![],
            ribbon: None,
            state: PromotionState::PrimaryCitation,
        };

        enter(PromotionState::PrimaryCitation, candidate_id, rank_short);
        let primary_fields = [
            TextField::new(NAME_FIELD, candidate.display_name.to_uppercase()),
            TextField::new(
                DATE_FIELD,
                format_date_token(primary_plan.date_template, effective_date),
            ),
        ];
        let primary_path =
            self.paths
                .primary_artifact(&candidate.display_name, rank, effective_date);
        self.produce(&primary_plan, &primary_fields, primary_path, &mut outcome)?;

        enter(PromotionState::RibbonCitation, candidate_id, rank_short);
        outcome.ribbon = Some(match ribbon_plan {
            None => RibbonDecision::NotRequired,
            Some(plan) => {
                if ribbon_awarded {
                    info!(
                        candidate_id,
                        rank = rank_short,
                        "Ribbon already awarded, skipping ribbon citation"
                    );
                    RibbonDecision::AlreadyAwarded
                } else {
                    let fields = [
                        TextField::new(
                            NAME_FIELD,
                            format!("{} {}", rank.long_name, candidate.display_name)
                                .to_uppercase(),
                        ),
                        TextField::new(
                            DATE_FIELD,
                            format_date_token(plan.date_template, effective_date),
                        ),
                    ];
                    let path =
                        self.paths
                            .ribbon_artifact(&candidate.display_name, rank, effective_date);
                    if self.produce(&plan, &fields, path, &mut outcome)? {
                        RibbonDecision::Generated
                    } else {
                        RibbonDecision::Failed
                    }
                }
            }
        });

        outcome.state = PromotionState::Done;
        enter(PromotionState::Done, candidate_id, rank_short);
        Ok(outcome)
    }

    fn plan_primary<'a>(&'a self, rank: &'a RankDefinition) -> Result<CitationPlan<'a>, PromotionError> {
        let layout = &rank.citation_layout;
        let plan = CitationPlan {
            kind: CitationKind::Primary,
            template: self.paths.primary_template(rank),
            layout,
            date_template: layout
                .date_template()
                .ok_or(PromotionError::MissingDateTemplate { citation: "primary" })?,
        };
        check_plan(&plan)?;
        Ok(plan)
    }

    /// `None` when the rank carries no ribbon. The ribbon date template is
    /// always the global one; a rank may override placement only.
    fn plan_ribbon<'a>(
        &'a self,
        rank: &'a RankDefinition,
    ) -> Result<Option<CitationPlan<'a>>, PromotionError> {
        if !rank.ribbon_required {
            return Ok(None);
        }
        let global = self
            .rules
            .ribbon_layout()
            .ok_or(PromotionError::MissingDateTemplate { citation: "ribbon" })?;
        let plan = CitationPlan {
            kind: CitationKind::Ribbon,
            template: self.paths.ribbon_template(rank),
            layout: rank.ribbon_layout.as_ref().unwrap_or(global),
            date_template: global
                .date_template()
                .ok_or(PromotionError::MissingDateTemplate { citation: "ribbon" })?,
        };
        check_plan(&plan)?;
        Ok(Some(plan))
    }

    /// Render and write one citation. Returns `false` when rendering failed
    /// for asset reasons; that failure is recorded and stays local to this
    /// citation.
    fn produce(
        &self,
        plan: &CitationPlan<'_>,
        fields: &[TextField],
        path: PathBuf,
        outcome: &mut PromotionOutcome,
    ) -> Result<bool, PromotionError> {
        match self.renderer.render(&plan.template, plan.layout, fields) {
            Ok(bytes) => {
                self.sink.write(&path, &bytes)?;
                info!(
                    kind = plan.kind.as_str(),
                    path = %path.display(),
                    "Citation generated"
                );
                outcome.artifact_paths.push(path);
                Ok(true)
            }
            Err(e) if e.is_configuration() => Err(e.into()),
            Err(e) => {
                warn!(kind = plan.kind.as_str(), error = %e, "Citation render failed");
                outcome.citation_failures.push(CitationFailure {
                    kind: plan.kind,
                    message: e.to_string(),
                });
                Ok(false)
            }
        }
    }
}

fn check_plan(plan: &CitationPlan<'_>) -> Result<(), PromotionError> {
    if let Some(field) = plan.layout.missing_field(&[NAME_FIELD, DATE_FIELD]) {
        return Err(PromotionError::MissingLayoutField {
            citation: plan.kind.as_str(),
            field: field.to_string(),
        });
    }
    if !plan.template.is_file() {
        return Err(PromotionError::MissingTemplate(plan.template.clone()));
    }
    Ok(())
}

fn enter(state: PromotionState, candidate_id: u64, rank: &str) {
    debug!(candidate_id, rank, state = ?state, "Promotion state");
}
