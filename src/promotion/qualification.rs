//! Qualification course detection over free-text service records.
//!
//! The course was once a single course and later split into two phases.
//! An entry is classified once: "phase ii" first (so "phase i" does not match
//! inside it), then "phase i", otherwise it is a legacy single-phase entry.

use super::rules::{RankDefinition, DEFAULT_QUALIFICATION_COURSES};
use super::traits::QualificationDetector;
use super::types::HistoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoursePhase {
    Legacy,
    PhaseOne,
    PhaseTwo,
}

/// Case-insensitive substring matching on course names and phase markers.
pub struct SubstringQualificationDetector {
    courses: Vec<String>,
}

impl SubstringQualificationDetector {
    pub fn new<I, S>(courses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            courses: courses
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Phase of the course mentioned by `entry`, if it mentions the course at all.
    pub fn classify(&self, entry: &HistoryEntry) -> Option<CoursePhase> {
        let text = entry.details.to_lowercase();
        if !self.courses.iter().any(|c| text.contains(c.as_str())) {
            return None;
        }
        if text.contains("phase ii") {
            Some(CoursePhase::PhaseTwo)
        } else if text.contains("phase i") {
            Some(CoursePhase::PhaseOne)
        } else {
            Some(CoursePhase::Legacy)
        }
    }
}

impl Default for SubstringQualificationDetector {
    fn default() -> Self {
        Self::new(DEFAULT_QUALIFICATION_COURSES)
    }
}

impl QualificationDetector for SubstringQualificationDetector {
    fn is_qualified(&self, history: &[HistoryEntry]) -> bool {
        let (mut phase_one, mut phase_two) = (false, false);
        for phase in history.iter().filter_map(|e| self.classify(e)) {
            match phase {
                CoursePhase::Legacy => return true,
                CoursePhase::PhaseOne => phase_one = true,
                CoursePhase::PhaseTwo => phase_two = true,
            }
        }
        phase_one && phase_two
    }
}

/// `None` when the rank has no qualification requirement.
pub fn check_qualification(
    history: &[HistoryEntry],
    rank: &RankDefinition,
    detector: &dyn QualificationDetector,
) -> Option<bool> {
    if !rank.requires_qualification_check {
        return None;
    }
    Some(detector.is_qualified(history))
}
