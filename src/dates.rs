//! Calendar helpers shared by the calculator and the range scheduler.
//!
//! The engine's only notion of "calendar awareness" is weekday index and the
//! Thu-Sat weekend block; see the crate-level docs for what's explicitly out
//! of scope (holidays, multi-tenant calendars, etc).

use chrono::{Duration, NaiveDate, Weekday};

/// `dd/mm/yyyy`, the external date format used by X-task keys and logs.
pub fn format_ddmmyyyy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parses the external `dd/mm/yyyy` format.
pub fn parse_ddmmyyyy(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// 0 = Monday … 6 = Sunday, per the engine's internal convention.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// Monday of the ISO week containing `date`.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(weekday_index(date) as i64)
}

/// Friday of the ISO week containing `date` — the "weekend anchor".
pub fn friday_of_week(date: NaiveDate) -> NaiveDate {
    monday_of_week(date) + Duration::days(4)
}

/// True if `date` falls within the same Mon-Sun week as `friday` (the Friday
/// anchoring that week).
pub fn in_week_of_friday(date: NaiveDate, friday: NaiveDate) -> bool {
    monday_of_week(date) == monday_of_week(friday)
}

/// Thursday (weekday index 3) — the first day of a weekend closing block.
pub fn is_thursday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Thu
}

/// True if `date` falls inside the Thu-Sat weekend closing block.
pub fn is_weekend_block_day(date: NaiveDate) -> bool {
    matches!(weekday_index(date), 3 | 4 | 5)
}

/// Every Thursday in `[start, end]`, ascending — one per weekend block.
pub fn thursdays_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    if start > end {
        return out;
    }
    let mut d = start;
    while d <= end {
        if is_thursday(d) {
            out.push(d);
        }
        d += Duration::days(1);
    }
    out
}

/// Every calendar day in `[start, end]`, ascending.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    if start > end {
        return out;
    }
    let mut d = start;
    while d <= end {
        out.push(d);
        d += Duration::days(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekday_index_matches_monday_zero_convention() {
        // 2025-01-06 is a Monday.
        assert_eq!(weekday_index(d(2025, 1, 6)), 0);
        assert_eq!(weekday_index(d(2025, 1, 9)), 3); // Thursday
        assert_eq!(weekday_index(d(2025, 1, 10)), 4); // Friday
        assert_eq!(weekday_index(d(2025, 1, 12)), 6); // Sunday
    }

    #[test]
    fn friday_of_week_anchors_correctly() {
        assert_eq!(friday_of_week(d(2025, 1, 6)), d(2025, 1, 10));
        assert_eq!(friday_of_week(d(2025, 1, 12)), d(2025, 1, 10));
    }

    #[test]
    fn thursdays_in_range_collects_weekend_starts() {
        let thursdays = thursdays_in_range(d(2025, 1, 1), d(2025, 1, 31));
        assert_eq!(thursdays, vec![d(2025, 1, 2), d(2025, 1, 9), d(2025, 1, 16), d(2025, 1, 23), d(2025, 1, 30)]);
    }

    #[test]
    fn ddmmyyyy_round_trips() {
        let date = d(2025, 1, 10);
        assert_eq!(format_ddmmyyyy(date), "10/01/2025");
        assert_eq!(parse_ddmmyyyy("10/01/2025"), Some(date));
    }
}
