//! Age arithmetic for eligibility windows.

use chrono::{DateTime, Datelike, NaiveDate};
use nom024_model::{AgeLimit, AgeUnit};

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Age at `at`, counted in `unit`: completed years, completed months or
/// elapsed days.
pub fn age_in(unit: AgeUnit, birth: NaiveDate, at: NaiveDate) -> i64 {
    match unit {
        AgeUnit::Years => {
            let years = i64::from(at.year() - birth.year());
            if (at.month(), at.day()) < (birth.month(), birth.day()) {
                years - 1
            } else {
                years
            }
        }
        AgeUnit::Months => {
            let months = i64::from(at.year() - birth.year()) * 12
                + i64::from(at.month())
                - i64::from(birth.month());
            if at.day() < birth.day() {
                months - 1
            } else {
                months
            }
        }
        AgeUnit::Days => (at - birth).num_days(),
    }
}

/// Whether the age at `at` lies inside the inclusive window.
pub fn within_window(
    min: Option<AgeLimit>,
    max: Option<AgeLimit>,
    birth: NaiveDate,
    at: NaiveDate,
) -> bool {
    let above_min = min.is_none_or(|limit| age_in(limit.unit, birth, at) >= i64::from(limit.amount));
    let below_max = max.is_none_or(|limit| age_in(limit.unit, birth, at) <= i64::from(limit.amount));
    above_min && below_max
}
