//! Deterministic template and artifact locations.
//!
//! Artifacts land in `{output_root}/{surname-first folder}/`, named from the
//! rank and the effective date, so re-running a promotion overwrites the
//! previous files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::Settings;
use crate::promotion::rules::RankDefinition;

/// Member folder name: surname first, hyphen-joined, lowercase.
/// "John Allen Smith" → "smith-john-allen".
pub fn folder_name(display_name: &str) -> String {
    let mut parts: Vec<&str> = display_name.split_whitespace().collect();
    if let Some(surname) = parts.pop() {
        parts.insert(0, surname);
    }
    parts.join("-").to_lowercase()
}

/// Template and output locations for one evaluation.
#[derive(Debug, Clone)]
pub struct CitationPaths {
    pub templates_dir: PathBuf,
    pub output_root: PathBuf,
    pub template_extension: String,
    pub output_extension: String,
}

impl CitationPaths {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            templates_dir: settings.templates_dir.clone(),
            output_root: settings.output_root.clone(),
            template_extension: settings.template_extension.clone(),
            output_extension: settings.output_extension.clone(),
        }
    }

    pub fn primary_template(&self, rank: &RankDefinition) -> PathBuf {
        self.templates_dir
            .join(format!("{}.{}", rank.short_code, self.template_extension))
    }

    pub fn ribbon_template(&self, rank: &RankDefinition) -> PathBuf {
        self.templates_dir
            .join(format!("NCO-{}.{}", rank.short_code, self.template_extension))
    }

    /// `{root}/{folder}/{payGrade}-{rankShort}-{YYMMDD}.{ext}`
    pub fn primary_artifact(
        &self,
        display_name: &str,
        rank: &RankDefinition,
        date: NaiveDate,
    ) -> PathBuf {
        self.member_dir(display_name).join(format!(
            "{}-{}-{}.{}",
            rank.pay_grade,
            rank.short_code,
            date_stamp(date),
            self.output_extension
        ))
    }

    /// `{root}/{folder}/NCO-{rankShort}-{YYMMDD}.{ext}`
    pub fn ribbon_artifact(
        &self,
        display_name: &str,
        rank: &RankDefinition,
        date: NaiveDate,
    ) -> PathBuf {
        self.member_dir(display_name).join(format!(
            "NCO-{}-{}.{}",
            rank.short_code,
            date_stamp(date),
            self.output_extension
        ))
    }

    fn member_dir(&self, display_name: &str) -> PathBuf {
        self.output_root.join(folder_name(display_name))
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

fn date_stamp(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}
