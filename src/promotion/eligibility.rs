//! Time-in-grade evaluation.
//!
//! Two month measures are in play and they intentionally disagree:
//! - pass/fail uses calendar months (end-of-month clipped, like a calendar)
//! - the reported eligible-by date uses 30-day months

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};

use super::rules::RankDefinition;
use super::types::EligibilityResult;

/// Days per month for the eligible-by approximation.
pub const APPROX_DAYS_PER_MONTH: i64 = 30;

/// Whole calendar months from `earlier` to `later`.
///
/// A month counts once `later` reaches the same day-of-month, with short
/// months clipped to their last day: Jan 31 → Feb 28 is 1, Jan 31 → Mar 1 is 1.
/// Negative when `later` precedes `earlier`.
pub fn months_between(earlier: NaiveDate, later: NaiveDate) -> i32 {
    if later < earlier {
        return -months_between(later, earlier);
    }

    let mut months = (later.year() - earlier.year()) * 12 + later.month() as i32
        - earlier.month() as i32;

    if months > 0 {
        let reached = earlier
            .checked_add_months(Months::new(months as u32))
            .is_some_and(|anniversary| anniversary <= later);
        if !reached {
            months -= 1;
        }
    }
    months
}

/// Eligible-by date: last promotion plus `required_months` × 30 days.
pub fn eligible_on(last_promotion: NaiveDateTime, required_months: u32) -> NaiveDate {
    (last_promotion + Duration::days(i64::from(required_months) * APPROX_DAYS_PER_MONTH)).date()
}

/// Check the time-in-grade requirement for promoting a member last promoted
/// at `last_promotion` to `rank` on `effective_date`.
///
/// Only calendar dates are compared: the time of day of `last_promotion` is
/// ignored, so a promotion at 2019-09-17 14:30 has 6 months in grade on
/// 2020-03-17.
pub fn check_time_in_grade(
    last_promotion: NaiveDateTime,
    rank: &RankDefinition,
    effective_date: NaiveDate,
) -> EligibilityResult {
    let required = rank.required_tig_months;
    if required == 0 {
        return EligibilityResult::Eligible;
    }

    let actual = months_between(last_promotion.date(), effective_date);
    if actual >= required as i32 {
        return EligibilityResult::Eligible;
    }

    EligibilityResult::TimeInGradeNotMet {
        required_months: required,
        actual_months: actual,
        eligible_on: eligible_on(last_promotion, required),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::rules::{ApproverPolicy, CitationLayout};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn promoted(day: NaiveDate) -> NaiveDateTime {
        day.and_hms_opt(14, 30, 0).unwrap()
    }

    fn rank(required: u32) -> RankDefinition {
        RankDefinition {
            short_code: "SGT".into(),
            long_name: "Sergeant".into(),
            pay_grade: "E-5".into(),
            required_tig_months: required,
            requires_qualification_check: false,
            ribbon_required: false,
            approver_policy: ApproverPolicy::None,
            citation_layout: CitationLayout::default(),
            ribbon_layout: None,
        }
    }

    #[test]
    fn end_of_month_start_counts_one_month() {
        assert_eq!(months_between(date(2019, 1, 31), date(2019, 3, 1)), 1);
    }

    #[test]
    fn clipped_anniversary_counts() {
        assert_eq!(months_between(date(2019, 1, 31), date(2019, 2, 28)), 1);
        assert_eq!(months_between(date(2019, 1, 31), date(2019, 2, 27)), 0);
    }

    #[test]
    fn day_before_anniversary_does_not_count() {
        assert_eq!(months_between(date(2019, 9, 17), date(2020, 3, 16)), 5);
        assert_eq!(months_between(date(2019, 9, 17), date(2020, 3, 17)), 6);
    }

    #[test]
    fn months_span_years() {
        assert_eq!(months_between(date(2018, 3, 1), date(2020, 3, 17)), 24);
    }

    #[test]
    fn same_day_is_zero() {
        assert_eq!(months_between(date(2020, 3, 17), date(2020, 3, 17)), 0);
    }

    #[test]
    fn reversed_dates_are_negative() {
        assert_eq!(months_between(date(2020, 3, 17), date(2019, 12, 17)), -3);
    }

    #[test]
    fn zero_requirement_always_eligible() {
        let c = promoted(date(2020, 3, 16));
        assert_eq!(
            check_time_in_grade(c, &rank(0), date(2020, 3, 17)),
            EligibilityResult::Eligible
        );
        // Even when the effective date precedes the last promotion.
        assert_eq!(
            check_time_in_grade(c, &rank(0), date(2001, 1, 1)),
            EligibilityResult::Eligible
        );
    }

    #[test]
    fn requirement_met_exactly() {
        let c = promoted(date(2019, 9, 1));
        assert_eq!(
            check_time_in_grade(c, &rank(6), date(2020, 3, 17)),
            EligibilityResult::Eligible
        );
    }

    #[test]
    fn requirement_not_met_reports_thirty_day_eligible_date() {
        let c = promoted(date(2019, 11, 1));
        let result = check_time_in_grade(c, &rank(6), date(2020, 3, 17));
        assert_eq!(
            result,
            EligibilityResult::TimeInGradeNotMet {
                required_months: 6,
                actual_months: 4,
                // 2019-11-01 + 180 days, not 2020-05-01
                eligible_on: date(2020, 4, 29),
            }
        );
    }

    #[test]
    fn eligible_on_ignores_calendar_months() {
        let last = date(2019, 1, 31).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(eligible_on(last, 1), date(2019, 3, 2));
        assert_eq!(eligible_on(last, 0), date(2019, 1, 31));
    }

    #[test]
    fn time_of_day_is_ignored() {
        let last = date(2019, 9, 17).and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(
            check_time_in_grade(last, &rank(6), date(2020, 3, 17)),
            EligibilityResult::Eligible
        );
        assert!(matches!(
            check_time_in_grade(last, &rank(6), date(2020, 3, 16)),
            EligibilityResult::TimeInGradeNotMet { actual_months: 5, .. }
        ));
    }
}
