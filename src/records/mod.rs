//! RecordProvider adapters.
//!
//! Both adapters read the roster API's record shape:
//! `{milpac_id, user_id, real_name, username, primary_position, promotion_date}`
//! for members and `{details}` for service record and award lines.

pub mod api;
pub mod snapshot;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::promotion::types::{AwardEntry, Candidate, HistoryEntry};

pub use api::ApiRecordProvider;
pub use snapshot::SnapshotRecordProvider;

const PROMOTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Roster member as served by the personnel API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRecord {
    pub milpac_id: u64,
    pub user_id: u64,
    pub real_name: String,
    pub username: String,
    #[serde(default)]
    pub primary_position: String,
    #[serde(default)]
    pub promotion_date: Option<String>,
}

/// A free-text record line (service record entry or award).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsRecord {
    pub details: String,
}

/// Members with a missing or unreadable promotion date are kept with
/// `last_promotion: None`; they still count for billet lookups.
impl From<RosterRecord> for Candidate {
    fn from(record: RosterRecord) -> Self {
        let last_promotion = record
            .promotion_date
            .as_deref()
            .and_then(parse_promotion_date);
        if last_promotion.is_none() {
            tracing::debug!(
                milpac_id = record.milpac_id,
                promotion_date = ?record.promotion_date,
                "Roster member has no readable promotion date"
            );
        }
        Candidate {
            id: record.milpac_id,
            user_id: record.user_id,
            display_name: record.real_name,
            username: record.username,
            position: record.primary_position,
            last_promotion,
        }
    }
}

impl From<DetailsRecord> for HistoryEntry {
    fn from(record: DetailsRecord) -> Self {
        HistoryEntry::new(record.details)
    }
}

impl From<DetailsRecord> for AwardEntry {
    fn from(record: DetailsRecord) -> Self {
        AwardEntry::new(record.details)
    }
}

/// "YYYY-MM-DD HH:MM:SS", or a bare date taken as midnight.
fn parse_promotion_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, PROMOTION_DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn into_candidates(records: Vec<RosterRecord>) -> Vec<Candidate> {
    records.into_iter().map(Candidate::from).collect()
}
