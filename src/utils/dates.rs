// src/utils/dates.rs

//! Source date parsing and remaining-time computation.
//!
//! Dates are kept as text on the record and only interpreted here, when a
//! publication is formatted or exported. Failures never propagate as errors;
//! they surface as [`SourceDate::Unparseable`] and render as "Desconocido".

use std::fmt;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Text shown when a date cannot be interpreted.
pub const UNKNOWN: &str = "Desconocido";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// A source date after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDate {
    Parsed(NaiveDateTime),
    Unparseable(String),
}

impl SourceDate {
    /// Interpret a date as presented by the source (day-month-year ordering).
    pub fn parse(text: &str) -> Self {
        let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");

        let parsed = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&trimmed, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(&trimmed, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });

        match parsed {
            Some(value) => Self::Parsed(value),
            None => Self::Unparseable(text.to_string()),
        }
    }

    pub fn value(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Parsed(value) => Some(*value),
            Self::Unparseable(_) => None,
        }
    }
}

/// Current wall-clock time at the source's offset.
pub fn source_now(offset: FixedOffset) -> NaiveDateTime {
    Utc::now().with_timezone(&offset).naive_local()
}

/// Time left until a publication expires, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingTime {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl RemainingTime {
    /// Compute `max(0, expires - now)` split into days, hours and minutes.
    pub fn until(expires: NaiveDateTime, now: NaiveDateTime) -> Self {
        let delta = (expires - now).max(TimeDelta::zero());
        let days = delta.num_days();
        let rest = delta.num_seconds() - days * 86_400;

        Self {
            days,
            hours: rest / 3_600,
            minutes: (rest % 3_600) / 60,
        }
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} días, {} horas, {} minutos",
            self.days, self.hours, self.minutes
        )
    }
}

/// Render the remaining time for a raw expiry text.
pub fn describe_remaining(expires_at: &str, now: NaiveDateTime) -> String {
    match SourceDate::parse(expires_at).value() {
        Some(expires) => RemainingTime::until(expires, now).to_string(),
        None => UNKNOWN.to_string(),
    }
}
