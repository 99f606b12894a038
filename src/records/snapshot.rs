//! Roster snapshot provider: one JSON document holding the roster plus
//! per-account service records and awards. Used for offline runs and tests.
//!
//! ```json
//! { "users": [ ... ], "records": { "1042": [{"details": "..."}] }, "awards": { ... } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{into_candidates, DetailsRecord, RosterRecord};
use crate::promotion::error::ProviderError;
use crate::promotion::traits::RecordProvider;
use crate::promotion::types::{AwardEntry, Candidate, HistoryEntry};

#[derive(Deserialize)]
struct SnapshotFile {
    users: Vec<RosterRecord>,
    #[serde(default)]
    records: HashMap<u64, Vec<DetailsRecord>>,
    #[serde(default)]
    awards: HashMap<u64, Vec<DetailsRecord>>,
}

/// In-memory provider. Accounts without entries have empty history/awards.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecordProvider {
    members: Vec<Candidate>,
    history: HashMap<u64, Vec<HistoryEntry>>,
    awards: HashMap<u64, Vec<AwardEntry>>,
}

impl SnapshotRecordProvider {
    pub fn new(members: Vec<Candidate>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    pub fn with_history(mut self, user_id: u64, entries: Vec<HistoryEntry>) -> Self {
        self.history.insert(user_id, entries);
        self
    }

    pub fn with_awards(mut self, user_id: u64, entries: Vec<AwardEntry>) -> Self {
        self.awards.insert(user_id, entries);
        self
    }

    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ProviderError::Snapshot(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProviderError> {
        let file: SnapshotFile =
            serde_json::from_str(raw).map_err(|e| ProviderError::Snapshot(e.to_string()))?;

        Ok(Self {
            members: into_candidates(file.users),
            history: entries(file.records),
            awards: entries(file.awards),
        })
    }
}

fn entries<T: From<DetailsRecord>>(map: HashMap<u64, Vec<DetailsRecord>>) -> HashMap<u64, Vec<T>> {
    map.into_iter()
        .map(|(id, lines)| (id, lines.into_iter().map(T::from).collect()))
        .collect()
}

impl RecordProvider for SnapshotRecordProvider {
    fn fetch_active_members(&self) -> Result<Vec<Candidate>, ProviderError> {
        Ok(self.members.clone())
    }

    fn fetch_history(&self, user_id: u64) -> Result<Vec<HistoryEntry>, ProviderError> {
        Ok(self.history.get(&user_id).cloned().unwrap_or_default())
    }

    fn fetch_awards(&self, user_id: u64) -> Result<Vec<AwardEntry>, ProviderError> {
        Ok(self.awards.get(&user_id).cloned().unwrap_or_default())
    }
}
