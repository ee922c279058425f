//! User-facing date parsing for conversation steps.
//!
//! Accepts `today`, `yesterday`, day-first numeric forms (`05/04/2025`,
//! `5-4-25`) and ISO (`2025-04-05`), normalizing everything to a
//! `NaiveDate`. Anything else is `None` so the caller can re-prompt.

use chrono::{Days, Local, NaiveDate};

/// Parse a user-supplied date relative to today (local time).
pub fn parse_user_date(input: &str) -> Option<NaiveDate> {
    parse_relative_to(input, Local::now().date_naive())
}

/// Parse relative to an explicit `today` (deterministic in tests).
pub fn parse_relative_to(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = input.trim().to_lowercase();
    match s.as_str() {
        "today" | "now" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        _ => {}
    }

    let parts: Vec<&str> = s.split(['/', '-']).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    // Year-first (ISO) when the first segment has four digits; otherwise
    // day-first, with 2-digit years read as 20xx.
    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0].parse().ok()?, parts[1].parse().ok()?, parts[2].parse().ok()?)
    } else {
        let mut year: i32 = parts[2].parse().ok()?;
        if parts[2].len() == 2 {
            year += 2000;
        }
        (year, parts[1].parse().ok()?, parts[0].parse().ok()?)
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    #[test]
    fn relative_words() {
        assert_eq!(parse_relative_to("Today", anchor()), Some(anchor()));
        assert_eq!(
            parse_relative_to("yesterday", anchor()),
            NaiveDate::from_ymd_opt(2025, 4, 9)
        );
    }

    #[test]
    fn day_first_numeric_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 5);
        assert_eq!(parse_relative_to("05/04/2025", anchor()), expected);
        assert_eq!(parse_relative_to("5-4-2025", anchor()), expected);
        assert_eq!(parse_relative_to("05/04/25", anchor()), expected);
    }

    #[test]
    fn iso_form() {
        assert_eq!(
            parse_relative_to("2025-04-05", anchor()),
            NaiveDate::from_ymd_opt(2025, 4, 5)
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_relative_to("next tuesday", anchor()), None);
        assert_eq!(parse_relative_to("32/01/2025", anchor()), None);
        assert_eq!(parse_relative_to("05/13/2025", anchor()), None);
        assert_eq!(parse_relative_to("", anchor()), None);
    }
}
