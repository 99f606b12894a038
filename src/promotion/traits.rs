//! Trait definitions for promotion evaluation.
//!
//! Four traits define the module boundaries:
//! - RecordProvider: roster, service record and award retrieval
//! - QualificationDetector: how course completion is recognised in free text
//! - CitationRenderer: text overlay onto a template image
//! - ArtifactSink: where rendered citations are written

use std::path::Path;

use super::error::{ProviderError, RenderError, SinkError};
use super::rules::CitationLayout;
use super::types::{AwardEntry, Candidate, HistoryEntry};

/// Supplies member records. Timeouts and retries are the implementor's concern.
pub trait RecordProvider {
    /// All active members (the roster snapshot for one evaluation).
    fn fetch_active_members(&self) -> Result<Vec<Candidate>, ProviderError>;

    /// Service record entries for an account.
    fn fetch_history(&self, user_id: u64) -> Result<Vec<HistoryEntry>, ProviderError>;

    /// Award entries for an account.
    fn fetch_awards(&self, user_id: u64) -> Result<Vec<AwardEntry>, ProviderError>;
}

/// Decides whether a member's history satisfies the qualification course.
/// Must not depend on entry order.
pub trait QualificationDetector {
    fn is_qualified(&self, history: &[HistoryEntry]) -> bool;
}

/// One text value to place on a citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub name: String,
    pub value: String,
}

impl TextField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Draws text fields onto a template and returns the encoded image.
pub trait CitationRenderer {
    fn render(
        &self,
        template: &Path,
        layout: &CitationLayout,
        fields: &[TextField],
    ) -> Result<Vec<u8>, RenderError>;
}

/// Persists rendered artifacts. Overwrites existing files at the same path.
pub trait ArtifactSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SinkError>;
}
