//! Personnel API client (blocking). No retries: failures surface to the
//! caller, which owns retry policy.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{into_candidates, DetailsRecord, RosterRecord};
use crate::config::ApiSettings;
use crate::promotion::error::{PromotionError, ProviderError};
use crate::promotion::traits::RecordProvider;
use crate::promotion::types::{AwardEntry, Candidate, HistoryEntry};

/// Every response is wrapped in `{"data": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ActiveUsers {
    users: Vec<RosterRecord>,
}

/// HTTP roster API provider authenticated with a bearer token.
pub struct ApiRecordProvider {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl ApiRecordProvider {
    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, PromotionError> {
        let key = settings.read_api_key()?;
        Ok(Self::new(&settings.base_url, key, settings.timeout_secs)?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Fetching personnel records");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| ProviderError::Http(format!("GET {url}: {e}")))?
            .error_for_status()
            .map_err(|e| ProviderError::Http(format!("GET {url}: {e}")))?;

        let envelope: Envelope<T> = response.json().map_err(|e| ProviderError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(envelope.data)
    }
}

impl RecordProvider for ApiRecordProvider {
    fn fetch_active_members(&self) -> Result<Vec<Candidate>, ProviderError> {
        let page: ActiveUsers = self.get("users/active")?;
        Ok(into_candidates(page.users))
    }

    fn fetch_history(&self, user_id: u64) -> Result<Vec<HistoryEntry>, ProviderError> {
        let records: Vec<DetailsRecord> = self.get(&format!("user/{user_id}/records"))?;
        Ok(records.into_iter().map(HistoryEntry::from).collect())
    }

    fn fetch_awards(&self, user_id: u64) -> Result<Vec<AwardEntry>, ProviderError> {
        let records: Vec<DetailsRecord> = self.get(&format!("user/{user_id}/awards"))?;
        Ok(records.into_iter().map(AwardEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let provider =
            ApiRecordProvider::new("https://api.example.test/v1/", "key".into(), 5).unwrap();
        assert_eq!(
            provider.endpoint("users/active"),
            "https://api.example.test/v1/users/active"
        );
        assert_eq!(
            provider.endpoint("/user/1042/awards"),
            "https://api.example.test/v1/user/1042/awards"
        );
    }

    #[test]
    fn active_users_envelope_decodes() {
        let raw = r#"{"data": {"users": [
            {"milpac_id": 258, "user_id": 1042, "real_name": "John Allen Smith",
             "username": "Smith.J", "primary_position": "Rifleman 1/B/2-7",
             "promotion_date": "2019-09-01 00:00:00"}
        ]}}"#;
        let envelope: Envelope<ActiveUsers> = serde_json::from_str(raw).unwrap();
        let members = into_candidates(envelope.data.users);
        assert_eq!(members[0].id, 258);
        assert_eq!(members[0].username, "Smith.J");
    }

    #[test]
    fn details_envelope_decodes() {
        let raw = r#"{"data": [{"details": "Graduated NCOA-WLC Phase II", "date": "2019-01-01"}]}"#;
        let envelope: Envelope<Vec<DetailsRecord>> = serde_json::from_str(raw).unwrap();
        let history: Vec<HistoryEntry> =
            envelope.data.into_iter().map(HistoryEntry::from).collect();
        assert_eq!(history[0].details, "Graduated NCOA-WLC Phase II");
    }

    #[test]
    fn from_settings_requires_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ApiSettings {
            base_url: "https://api.example.test/v1".into(),
            api_key_file: dir.path().join("APIKey.txt"),
            timeout_secs: 5,
        };
        let err = ApiRecordProvider::from_settings(&settings).err().unwrap();
        assert!(matches!(err, PromotionError::Config(_)));
    }
}
