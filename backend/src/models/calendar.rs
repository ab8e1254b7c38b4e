//! Calendar arithmetic for planning: date ranges, ISO weeks, flexible date
//! parsing and shift durations.
//!
//! Everything here works on naive (tenant-local) dates and times. Schedules
//! are day-granular, so no timezone conversion happens in this crate.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::absence::{Holiday, SupplementaryDayType};

/// Excel stores dates as days elapsed since this epoch (it wrongly treats 1900 as leap).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Working days when neither the site nor the tenant configures any (Monday to Saturday).
pub const DEFAULT_WORKING_DAYS: [u32; 6] = [1, 2, 3, 4, 5, 6];

/// Wall-clock time formatted as `HH:mm` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(pub NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// Minutes elapsed since midnight.
    pub fn minutes(&self) -> i64 {
        i64::from(self.0.hour()) * 60 + i64::from(self.0.minute())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s).ok_or_else(|| format!("Heure invalide: {}. Format attendu: HH:mm", s))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// All dates between `start` and `end`, both inclusive. Empty when `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Number of days from `start` to `end` (negative when `end` precedes `start`).
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sunday of the ISO week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month_first
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// ISO weekday number: 1 = Monday ... 7 = Sunday.
pub fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

pub fn is_working_day(date: NaiveDate, working_days: &[u32]) -> bool {
    working_days.contains(&iso_weekday(date))
}

pub fn french_day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}

/// Classify a date for supplementary-day compensation. Holidays win over weekends.
pub fn classify_supplementary_day(
    date: NaiveDate,
    holidays: &[Holiday],
) -> Option<SupplementaryDayType> {
    if holidays.iter().any(|h| h.matches(date)) {
        return Some(SupplementaryDayType::Holiday);
    }
    match date.weekday() {
        Weekday::Sat => Some(SupplementaryDayType::WeekendSaturday),
        Weekday::Sun => Some(SupplementaryDayType::WeekendSunday),
        _ => None,
    }
}

/// Parse a user supplied date.
///
/// Accepted forms, in order: `DD/MM/YYYY`, `YYYY-MM-DD`, a positive Excel
/// serial number, and finally an RFC 3339 timestamp (its date part is kept).
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some([day, month, year]) = split_numeric(trimmed, '/', [2, 2, 4]) {
        return NaiveDate::from_ymd_opt(year as i32, month, day);
    }

    if let Some([year, month, day]) = split_numeric(trimmed, '-', [4, 2, 2]) {
        return NaiveDate::from_ymd_opt(year as i32, month, day);
    }

    if let Ok(serial) = trimmed.parse::<f64>() {
        if serial > 0.0 && serial.is_finite() {
            let (y, m, d) = EXCEL_EPOCH;
            let days = Duration::try_days(serial.trunc() as i64)?;
            return NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|epoch| epoch.checked_add_signed(days));
        }
        return None;
    }

    chrono::DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Split `s` on `sep` into three unsigned parts whose digit counts fit `widths`.
///
/// A width of 4 must match exactly; smaller widths accept one or two digits.
fn split_numeric(s: &str, sep: char, widths: [usize; 3]) -> Option<[u32; 3]> {
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut out = [0u32; 3];
    for (i, (part, width)) in parts.iter().zip(widths).enumerate() {
        let len_ok = if width == 4 {
            part.len() == 4
        } else {
            (1..=width).contains(&part.len())
        };
        if !len_ok || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        out[i] = part.parse().ok()?;
    }
    Some(out)
}

/// Strict `H:mm` / `HH:mm` parser (hours 0-23, minutes 00-59).
pub fn parse_time_of_day(input: &str) -> Option<TimeOfDay> {
    let (hours, minutes) = input.trim().split_once(':')?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.bytes().all(|b| b.is_ascii_digit())
        || !minutes.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let h: u32 = hours.parse().ok()?;
    let m: u32 = minutes.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    TimeOfDay::new(h, m)
}

/// `true` when a shift starting at `start` and ending at `end` finishes the next day.
pub fn crosses_midnight(start: TimeOfDay, end: TimeOfDay) -> bool {
    end < start
}

/// Worked hours of a shift, break deducted. Never negative.
pub fn shift_hours(start: TimeOfDay, end: TimeOfDay, break_minutes: u32) -> f64 {
    let mut minutes = end.minutes() - start.minutes();
    if crosses_midnight(start, end) {
        minutes += 24 * 60;
    }
    let worked = minutes - i64::from(break_minutes);
    worked.max(0) as f64 / 60.0
}

/// Concrete start and end instants of a shift worked on `date`.
pub fn shift_interval(
    date: NaiveDate,
    start: TimeOfDay,
    end: TimeOfDay,
) -> (NaiveDateTime, NaiveDateTime) {
    let begin = date.and_time(start.time());
    let end_date = if crosses_midnight(start, end) {
        date + Duration::days(1)
    } else {
        date
    };
    (begin, end_date.and_time(end.time()))
}

/// Hours elapsed between two instants (negative when they overlap).
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_minutes() as f64 / 60.0
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod calendar_tests;
