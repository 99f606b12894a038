//! Approver resolution from the rank's approver policy and the candidate's
//! position in the unit hierarchy.

use super::error::ApproverError;
use super::position::parse_position;
use super::rules::{ApproverPolicy, RankDefinition};
use super::types::Candidate;

/// Resolve who approves promoting `candidate` to `rank`.
///
/// A position without a company/battalion designation yields
/// `ApproverError::Undefined`, distinct from the literal "N/A" of a rank
/// that needs no approver.
pub fn resolve(
    candidate: &Candidate,
    rank: &RankDefinition,
    roster: &[Candidate],
) -> Result<String, ApproverError> {
    let unit = parse_position(&candidate.position)
        .ok_or_else(|| ApproverError::Undefined(candidate.position.clone()))?;

    match rank.approver_policy {
        ApproverPolicy::None => Ok("N/A".to_string()),
        ApproverPolicy::Rtc => Ok("Recruit Training Command".to_string()),
        ApproverPolicy::S1 => Ok("S1 Department".to_string()),
        ApproverPolicy::Company => find_by_billet(roster, &format!("Commander {}", unit.company)),
        ApproverPolicy::Battalion => {
            find_by_billet(roster, &format!("Battalion Commander {}", unit.battalion))
        }
        ApproverPolicy::ChiefOfStaff => find_by_billet(roster, "Chief of Staff"),
        ApproverPolicy::RegimentalCommander => find_by_billet(roster, "Regimental Commander"),
    }
}

/// Member holding exactly `billet`, formatted as "{displayName} | @{username}".
pub fn find_by_billet(roster: &[Candidate], billet: &str) -> Result<String, ApproverError> {
    roster
        .iter()
        .find(|m| m.position == billet)
        .map(|m| format!("{} | @{}", m.display_name, m.username))
        .ok_or_else(|| ApproverError::BilletNotFound(billet.to_string()))
}
