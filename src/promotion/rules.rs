//! Rank rule definitions and citation layouts.
//!
//! Reads the rules file format used by the personnel office:
//!
//! ```json
//! {
//!   "ranks": [{
//!     "short": "SGT", "long": "Sergeant", "paygrade": "E-5",
//!     "RequiredTIG": 6, "CheckNCOA": true, "NCORibbon": true,
//!     "Approver": "Battalion",
//!     "citation": {
//!       "name": { "pos": [1650, 1010], "fontName": "OldEnglish.ttf", "fontSize": 90 },
//!       "date": { "pos": [1650, 1480], "fontName": "Garamond.ttf", "fontSize": 48,
//!                 "dateText": "this [d] day of [m], [y]" }
//!     }
//!   }],
//!   "NCORibbon": { "citation": { ... } }
//! }
//! ```
//!
//! Loaded once per evaluation and never mutated afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;

/// Layout field carrying the member's name.
pub const NAME_FIELD: &str = "name";
/// Layout field carrying the formatted date.
pub const DATE_FIELD: &str = "date";

/// Course names recognised as the NCO qualification course.
pub const DEFAULT_QUALIFICATION_COURSES: &[&str] =
    &["ncoa warrior leadership course", "ncoa-wlc"];

// ═══════════════════════════════════════════
// Approver policy
// ═══════════════════════════════════════════

/// Which authority signs off on a rank's promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawApprover")]
pub enum ApproverPolicy {
    #[default]
    None,
    Rtc,
    S1,
    Company,
    Battalion,
    ChiefOfStaff,
    RegimentalCommander,
}

impl ApproverPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "None" => Some(Self::None),
            "RTC" => Some(Self::Rtc),
            "S1" => Some(Self::S1),
            "Company" => Some(Self::Company),
            "Battalion" => Some(Self::Battalion),
            "COS" | "ChiefOfStaff" => Some(Self::ChiefOfStaff),
            "GOA" | "RegimentalCommander" => Some(Self::RegimentalCommander),
            _ => None,
        }
    }
}

/// `false`/`null` mean no approver; strings name a policy.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawApprover {
    Flag(bool),
    Name(String),
    Null(()),
}

impl TryFrom<RawApprover> for ApproverPolicy {
    type Error = String;

    fn try_from(raw: RawApprover) -> Result<Self, Self::Error> {
        match raw {
            RawApprover::Flag(false) | RawApprover::Null(()) => Ok(Self::None),
            RawApprover::Flag(true) => Err("Approver `true` does not name a policy".into()),
            RawApprover::Name(name) => {
                Self::from_name(&name).ok_or_else(|| format!("unknown approver policy '{name}'"))
            }
        }
    }
}

// ═══════════════════════════════════════════
// Layouts
// ═══════════════════════════════════════════

/// Where and how one text field is drawn. `pos` is the text's visual center.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldLayout {
    pub pos: (f32, f32),
    #[serde(rename = "fontName")]
    pub font: String,
    #[serde(rename = "fontSize")]
    pub font_size: f32,
    /// Date template, only meaningful on the date field.
    #[serde(rename = "dateText", default)]
    pub date_text: Option<String>,
}

/// Field name → placement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct CitationLayout {
    fields: BTreeMap<String, FieldLayout>,
}

impl CitationLayout {
    pub fn new(fields: BTreeMap<String, FieldLayout>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.get(name)
    }

    pub fn date_template(&self) -> Option<&str> {
        self.field(DATE_FIELD)?.date_text.as_deref()
    }

    /// First of `required` that has no layout entry.
    pub fn missing_field<'a>(&self, required: &[&'a str]) -> Option<&'a str> {
        required.iter().copied().find(|f| !self.fields.contains_key(*f))
    }
}

// ═══════════════════════════════════════════
// Rank definitions
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankDefinition {
    #[serde(rename = "short")]
    pub short_code: String,
    #[serde(rename = "long")]
    pub long_name: String,
    #[serde(rename = "paygrade")]
    pub pay_grade: String,
    #[serde(rename = "RequiredTIG", default)]
    pub required_tig_months: u32,
    #[serde(rename = "CheckNCOA", default)]
    pub requires_qualification_check: bool,
    #[serde(rename = "NCORibbon", default)]
    pub ribbon_required: bool,
    #[serde(rename = "Approver", default)]
    pub approver_policy: ApproverPolicy,
    #[serde(rename = "citation")]
    pub citation_layout: CitationLayout,
    /// Per-rank placement override for the ribbon citation. The ribbon date
    /// template always comes from the global ribbon layout.
    #[serde(rename = "ribbonCitation", default)]
    pub ribbon_layout: Option<CitationLayout>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RibbonConfig {
    pub citation: CitationLayout,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QualificationSettings {
    #[serde(default = "default_courses")]
    pub courses: Vec<String>,
}

impl Default for QualificationSettings {
    fn default() -> Self {
        Self {
            courses: default_courses(),
        }
    }
}

fn default_courses() -> Vec<String> {
    DEFAULT_QUALIFICATION_COURSES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// All rank rules plus the global ribbon citation layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleConfig {
    pub ranks: Vec<RankDefinition>,
    #[serde(rename = "NCORibbon", default)]
    pub ribbon: Option<RibbonConfig>,
    #[serde(default)]
    pub qualification: QualificationSettings,
}

impl RuleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RuleConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            ranks = config.ranks.len(),
            "Rule configuration loaded"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: RuleConfig = serde_json::from_str(raw)
            .map_err(|e| ConfigError::InvalidRules(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn rank(&self, short_code: &str) -> Option<&RankDefinition> {
        self.ranks.iter().find(|r| r.short_code == short_code)
    }

    /// Global ribbon layout, if configured.
    pub fn ribbon_layout(&self) -> Option<&CitationLayout> {
        self.ribbon.as_ref().map(|r| &r.citation)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for rank in &self.ranks {
            if !seen.insert(rank.short_code.as_str()) {
                return Err(ConfigError::InvalidRules(format!(
                    "rank '{}' defined more than once",
                    rank.short_code
                )));
            }
            if rank.ribbon_required && self.ribbon.is_none() {
                return Err(ConfigError::InvalidRules(format!(
                    "rank '{}' requires a ribbon citation but NCORibbon is not configured",
                    rank.short_code
                )));
            }
        }
        Ok(())
    }
}
