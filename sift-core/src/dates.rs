//! Date tokens found at the start of statement lines, and year resolution
//! for the year-less forms.
//!
//! Supported forms:
//!   2024-01-28                  (ISO, optionally quoted)
//!   JAN 28 JAN 29 DESCRIPTION   (credit card: transaction + posting date)
//!   28 Jan DESCRIPTION          (chequing)

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Which leading-date forms a statement layout accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateStyle {
    Iso,
    MonDay,
    DayMon,
}

impl DateStyle {
    pub const ALL: [DateStyle; 3] = [DateStyle::Iso, DateStyle::MonDay, DateStyle::DayMon];
}

/// A date as printed; `year` is only known for ISO dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMarker {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

impl fmt::Display for DateMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(y) => write!(f, "{y:04}-{:02}-{:02}", self.month, self.day),
            None => match self.month.checked_sub(1).and_then(|i| MONTHS.get(i as usize)) {
                Some(name) => write!(f, "{} {}", name.to_uppercase(), self.day),
                None => write!(f, "{:02}/{:02}", self.month, self.day),
            },
        }
    }
}

/// Result of stripping the leading date token(s) from a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadingDates {
    pub date: DateMarker,
    /// Second date token directly after the first (posting date)
    pub posted: Option<DateMarker>,
    /// Remaining text, trimmed
    pub rest: String,
}

/// Month number for a three-letter abbreviation, any case.
pub fn month_from_abbr(s: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(s))
        .map(|i| i as u32 + 1)
}

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*"?(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})"?(?:\s+|$)"#)
            .expect("iso date regex")
    })
}

fn mon_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<mon>[A-Za-z]{3})\.?\s+(?P<d>\d{1,2})(?:\s+|$)").expect("mon-day regex")
    })
}

fn day_mon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<d>\d{1,2})\s+(?P<mon>[A-Za-z]{3})(?:\s+|$)").expect("day-mon regex")
    })
}

fn valid_day(month: u32, day: u32) -> bool {
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Match one date token at the start of `text`; returns the marker and the
/// number of bytes consumed.
fn leading_date(text: &str, style: DateStyle) -> Option<(DateMarker, usize)> {
    match style {
        DateStyle::Iso => {
            let caps = iso_re().captures(text)?;
            let year: i32 = caps["y"].parse().ok()?;
            let month: u32 = caps["m"].parse().ok()?;
            let day: u32 = caps["d"].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)?;
            let marker = DateMarker {
                year: Some(year),
                month,
                day,
            };
            Some((marker, caps.get(0)?.end()))
        }
        DateStyle::MonDay | DateStyle::DayMon => {
            let re = if style == DateStyle::MonDay {
                mon_day_re()
            } else {
                day_mon_re()
            };
            let caps = re.captures(text)?;
            let month = month_from_abbr(&caps["mon"])?;
            let day: u32 = caps["d"].parse().ok()?;
            if !valid_day(month, day) {
                return None;
            }
            let marker = DateMarker {
                year: None,
                month,
                day,
            };
            Some((marker, caps.get(0)?.end()))
        }
    }
}

/// Strip a leading date (and an optional second, posting date of the same
/// style) from `line`. Styles are tried in the given order.
pub fn strip_leading_dates(line: &str, styles: &[DateStyle]) -> Option<LeadingDates> {
    for &style in styles {
        let Some((date, used)) = leading_date(line, style) else {
            continue;
        };
        let mut rest = &line[used..];
        let mut posted = None;
        if let Some((second, used2)) = leading_date(rest, style) {
            posted = Some(second);
            rest = &rest[used2..];
        }
        return Some(LeadingDates {
            date,
            posted,
            rest: rest.trim().to_string(),
        });
    }
    None
}

/// Assigns years to year-less date markers, walking a statement in order.
///
/// Seeded with the statement date. A first marker whose month is later than
/// the statement month belongs to the previous year. After that each marker
/// takes the year that puts it nearest the previous one, so a step back in
/// month of more than six (e.g. DEC to FEB) advances the year and a step
/// forward of more than six goes back one.
#[derive(Debug, Clone)]
pub struct YearTracker {
    start: NaiveDate,
    year: i32,
    last: Option<NaiveDate>,
}

impl YearTracker {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            year: start.year(),
            last: None,
        }
    }

    /// Current working year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Resolve a marker and advance the tracker. `None` for impossible
    /// dates (e.g. `FEB 30`).
    pub fn resolve(&mut self, marker: DateMarker) -> Option<NaiveDate> {
        if let Some(year) = marker.year {
            let date = NaiveDate::from_ymd_opt(year, marker.month, marker.day)?;
            self.year = year;
            self.last = Some(date);
            return Some(date);
        }

        match self.last {
            None if marker.month > self.start.month() => {
                self.year = self.start.year() - 1;
            }
            None => {}
            Some(last) => {
                let step = marker.month as i32 - last.month() as i32;
                self.year = match step {
                    s if s < -6 => last.year() + 1,
                    s if s > 6 => last.year() - 1,
                    _ => last.year(),
                };
            }
        }

        let date = NaiveDate::from_ymd_opt(self.year, marker.month, marker.day)?;
        self.last = Some(date);
        Some(date)
    }

    /// Resolve a posting date relative to its transaction date, without
    /// moving the tracker.
    pub fn resolve_after(&self, marker: DateMarker, anchor: NaiveDate) -> Option<NaiveDate> {
        let year = match marker.year {
            Some(y) => y,
            None if anchor.month() == 12 && marker.month == 1 => anchor.year() + 1,
            None => anchor.year(),
        };
        NaiveDate::from_ymd_opt(year, marker.month, marker.day)
    }
}
