//! Unit designation parsing from free-text position strings.

use std::sync::LazyLock;

use regex::Regex;

/// A single company letter, "/", then a battalion token like "1-7".
static UNIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])/(\d-\d)").unwrap());

/// Company and battalion extracted from a position such as "Squad Leader 1/A/1-7".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPosition {
    /// Company designation including battalion, e.g. "A/1-7".
    pub company: String,
    /// Battalion token, e.g. "1-7".
    pub battalion: String,
}

/// First unit designation in `position`, or `None` when there is none.
pub fn parse_position(position: &str) -> Option<UnitPosition> {
    let caps = UNIT_PATTERN.captures(position)?;
    let letter = &caps[1];
    let battalion = &caps[2];
    Some(UnitPosition {
        company: format!("{letter}/{battalion}"),
        battalion: battalion.to_string(),
    })
}
