use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Approximate school-term calendar. Terms outside 1..=3 span the whole year.
/// Returns `None` only for years chrono cannot represent.
pub fn term_dates(year: i32, term: u32) -> Option<TermDates> {
    let (start, end) = match term {
        1 => (ymd(year, 1, 15)?, ymd(year, 4, 30)?),
        2 => (ymd(year, 5, 1)?, ymd(year, 8, 31)?),
        3 => (ymd(year, 9, 1)?, ymd(year, 11, 30)?),
        _ => (ymd(year, 1, 1)?, ymd(year, 12, 31)?),
    };
    Some(TermDates { start, end })
}
