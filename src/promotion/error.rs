//! Error types for promotion evaluation.
//!
//! Rejections (time-in-grade, qualification) are NOT errors: they are normal
//! terminal outcomes carried by `EligibilityResult`.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Failure talking to the record provider. Fatal for the current evaluation.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Failure rendering a single citation image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Layout has no entry for field '{0}'")]
    MissingLayoutField(String),

    #[error("Template image {path} unreadable: {reason}")]
    TemplateUnreadable { path: PathBuf, reason: String },

    #[error("Font {path} unreadable: {reason}")]
    FontUnreadable { path: PathBuf, reason: String },

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

impl RenderError {
    /// A missing layout field is a configuration problem, not an asset problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingLayoutField(_))
    }
}

/// Failure writing an artifact.
#[derive(Error, Debug)]
#[error("Cannot write {path}: {source}")]
pub struct SinkError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Approver resolution failure. Informational only; never blocks citations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApproverError {
    #[error("Position '{0}' has no company/battalion designation")]
    Undefined(String),

    #[error("No member holds billet '{0}'")]
    BilletNotFound(String),
}

/// Broad classification used by callers to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    DataNotFound,
    Provider,
    Render,
    Sink,
}

#[derive(Error, Debug)]
pub enum PromotionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rank '{0}' is not configured")]
    UnknownRank(String),

    #[error("{citation} layout is missing field '{field}'")]
    MissingLayoutField { citation: &'static str, field: String },

    #[error("{citation} layout has no date template")]
    MissingDateTemplate { citation: &'static str },

    #[error("Template image not found: {0}")]
    MissingTemplate(PathBuf),

    #[error("Member {0} not found in active roster")]
    MemberNotFound(u64),

    #[error("Record provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Artifact sink error: {0}")]
    Sink(#[from] SinkError),
}

impl PromotionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_)
            | Self::UnknownRank(_)
            | Self::MissingLayoutField { .. }
            | Self::MissingDateTemplate { .. }
            | Self::MissingTemplate(_) => ErrorKind::Configuration,
            Self::MemberNotFound(_) => ErrorKind::DataNotFound,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Render(e) if e.is_configuration() => ErrorKind::Configuration,
            Self::Render(_) => ErrorKind::Render,
            Self::Sink(_) => ErrorKind::Sink,
        }
    }
}
