//! Date token substitution for citation text.
//!
//! Tokens: `[d]` ordinal day, `[D]` uppercase ordinal day, `[m]` month name,
//! `[M]` uppercase month name, `[y]` four-digit year.

use chrono::{Datelike, NaiveDate};

/// Number with its English ordinal suffix: 1st, 2nd, 3rd, 11th, 21st, 101st.
pub fn ordinal_indicator(n: u32) -> String {
    let suffix = if (11..=19).contains(&n) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{n}{suffix}")
}

/// Replace every date token in `template` with the matching part of `date`.
pub fn format_date_token(template: &str, date: NaiveDate) -> String {
    let day = ordinal_indicator(date.day());
    let month = date.format("%B").to_string();
    let replacements = [
        ("[d]", day.clone()),
        ("[D]", day.to_uppercase()),
        ("[m]", month.clone()),
        ("[M]", month.to_uppercase()),
        ("[y]", format!("{:04}", date.year())),
    ];

    replacements
        .iter()
        .fold(template.to_string(), |text, (token, value)| {
            text.replace(token, value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ordinal_teens_take_th() {
        assert_eq!(ordinal_indicator(11), "11th");
        assert_eq!(ordinal_indicator(12), "12th");
        assert_eq!(ordinal_indicator(13), "13th");
        assert_eq!(ordinal_indicator(19), "19th");
    }

    #[test]
    fn ordinal_by_last_digit() {
        assert_eq!(ordinal_indicator(1), "1st");
        assert_eq!(ordinal_indicator(21), "21st");
        assert_eq!(ordinal_indicator(22), "22nd");
        assert_eq!(ordinal_indicator(23), "23rd");
        assert_eq!(ordinal_indicator(24), "24th");
        assert_eq!(ordinal_indicator(30), "30th");
        assert_eq!(ordinal_indicator(101), "101st");
    }

    #[test]
    fn uppercase_tokens() {
        assert_eq!(
            format_date_token("[D] of [M], [y]", date(2020, 3, 17)),
            "17TH of MARCH, 2020"
        );
    }

    #[test]
    fn lowercase_tokens() {
        assert_eq!(
            format_date_token("this [d] day of [m], [y]", date(2020, 1, 2)),
            "this 2nd day of January, 2020"
        );
    }

    #[test]
    fn repeated_and_mixed_tokens() {
        assert_eq!(
            format_date_token("[d]/[D] [m]/[M] [y][y]", date(2021, 8, 23)),
            "23rd/23RD August/AUGUST 20212021"
        );
    }

    #[test]
    fn template_without_tokens_unchanged() {
        assert_eq!(format_date_token("Signed", date(2020, 3, 17)), "Signed");
    }
}
