//! Gregorian resolution of parsed era dates, and Julian → Gregorian
//! conversion for source tables kept in the Julian calendar.

use chrono::{Datelike, Days, NaiveDate, TimeDelta};
use gengou_types::DateArray;

use crate::parser::{ParsedEraDate, parse_era_date};
use crate::registry::EraRegistry;

fn to_naive(date: DateArray) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), date.day())
}

fn from_naive(date: NaiveDate) -> DateArray {
    DateArray(date.year(), date.month(), date.day())
}

/// Advance a date by `days` calendar days.
pub fn add_days(date: DateArray, days: u32) -> Option<DateArray> {
    to_naive(date)?
        .checked_add_days(Days::new(u64::from(days)))
        .map(from_naive)
}

/// Turn a parsed era date into a Gregorian date.
///
/// Needs both month and day. The anchor is the first day of the era-month,
/// so a day past the end of that month rolls into the next calendar month.
pub fn resolve(parsed: &ParsedEraDate, registry: &EraRegistry) -> Option<DateArray> {
    let (month, day) = (parsed.month?, parsed.day?);
    let anchor = registry.anchor(&parsed.era, parsed.table_year(), month)?;
    add_days(anchor, day.checked_sub(1)?)
}

/// Parse and resolve in one step: "令和2年5月1日" → `[2020, 5, 1]`.
pub fn era_date_to_gregorian(text: &str, registry: &EraRegistry) -> Option<DateArray> {
    resolve(&parse_era_date(text, registry)?, registry)
}

/// Days the Gregorian calendar runs ahead of the Julian one.
///
/// January and February count toward the previous year, since the Julian
/// leap day that opens the gap sits at the end of February.
pub fn julian_offset(year: i32, month: u32) -> i32 {
    let y = if month <= 2 { year - 1 } else { year };
    let century = y.div_euclid(100);
    let a = century.div_euclid(4);
    let b = century.rem_euclid(4);
    3 * a + b - 2
}

/// Convert a proleptic Julian date to the proleptic Gregorian date of the
/// same day.
///
/// The Julian triple is laid onto the Gregorian day axis from the first of
/// its month, so a Julian 29 February in a Gregorian common year rolls into
/// March before the offset is applied. `None` only for a month outside
/// 1..=12 or a date beyond chrono's range.
pub fn julian_to_gregorian(date: DateArray) -> Option<DateArray> {
    let DateArray(year, month, day) = date;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let shift = i64::from(day) - 1 + i64::from(julian_offset(year, month));
    first
        .checked_add_signed(TimeDelta::try_days(shift)?)
        .map(from_naive)
}
