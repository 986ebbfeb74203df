//! Calendar timestamps with partially-specified time fields
//!
//! A [`Timestamp`] is the shared currency between the parser, the solar
//! ephemeris, and the lunar phase calculations. Time-of-day fields are
//! optional so that callers can tell "midnight" apart from "no time
//! given", and the daylight-saving flag is tri-state: `Unknown` asks for
//! auto-detection against the system time zone during resolution.

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, TimeZone, Timelike};
use thiserror::Error;

mod parse;

/// Error type for date/time text parsing
///
/// Carries the 1-based offset of the first invalid character in the
/// (trimmed) input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid date/time text at offset {offset}")]
pub struct ParseError {
    /// 1-based offset of the first invalid character
    pub offset: usize,
}

/// Tri-state daylight-saving flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dst {
    /// Not yet determined; resolved against the system zone when needed
    Unknown,
    /// Standard time
    Off,
    /// Daylight-saving time
    On,
}

/// A calendar date with optional time-of-day fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    /// Full year, e.g. 1984
    pub year: i32,
    /// Month, 1-12
    pub month: u32,
    /// Day of month, 1-31
    pub day: u32,
    /// Hour 0-23; `None` when the input gave no hour
    pub hour: Option<u32>,
    /// Minute 0-59; `None` when the input gave no minute
    pub minute: Option<u32>,
    /// Second 0-59; `None` when the input gave no second
    pub second: Option<u32>,
    /// Daylight-saving state of the date
    pub dst: Dst,
    /// The input carried an explicit UTC marker (`Z` suffix)
    pub utc: bool,
}

/// Days per month in a non-leap year
pub(crate) const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 400 == 0 || year % 100 != 0)
}

/// Number of days in a month; `month` must be 1-12
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        MONTH_DAYS[month as usize - 1]
    }
}

impl Timestamp {
    /// Parse a flexible date/time text into a resolved timestamp.
    ///
    /// Accepted forms: `[+CC]YY[-]MM[-]DD[THH[:MM[:SS]]][Z]`, the ordinal
    /// form `YYYY-DDD`, and a bare `HH:MM[:SS][Z]` defaulting the date to
    /// the current local day. Without an explicit century, two-digit years
    /// below 70 map to the 2000s and the rest to the 1900s.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse::parse(text)
    }

    /// The current local date and time
    pub fn now() -> Self {
        Self::from_local(&Local::now())
    }

    /// Build a fully-specified timestamp from a local date/time
    pub fn from_local(dt: &DateTime<Local>) -> Self {
        Timestamp {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: Some(dt.hour()),
            minute: Some(dt.minute()),
            second: Some(dt.second()),
            dst: if offset_is_dst(dt) { Dst::On } else { Dst::Off },
            utc: false,
        }
    }

    /// Day of the year, 1-based (January 1st is 1)
    pub fn day_of_year(&self) -> u32 {
        let mut yday = self.day;
        for month in 1..self.month {
            yday += MONTH_DAYS[month as usize - 1];
        }
        if self.month > 2 && is_leap_year(self.year) {
            yday += 1;
        }
        yday
    }

    /// Whether daylight-saving time applies to this timestamp.
    ///
    /// A resolved `On`/`Off` flag is returned as-is; `Unknown` is
    /// auto-detected by interpreting the fields as local time.
    pub fn dst_is_on(&self) -> bool {
        match self.dst {
            Dst::On => true,
            Dst::Off => false,
            Dst::Unknown => NaiveDate::from_ymd_opt(self.year, self.month, self.day)
                .and_then(|d| {
                    d.and_hms_opt(
                        self.hour.unwrap_or(12),
                        self.minute.unwrap_or(0),
                        self.second.unwrap_or(0),
                    )
                })
                .and_then(|naive| Local.from_local_datetime(&naive).earliest())
                .map(|dt| offset_is_dst(&dt))
                .unwrap_or(false),
        }
    }

    /// The date as zero-padded `YYYY-MM-DD`
    pub fn format_date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Resolve captured calendar fields into a normalized local timestamp.
    ///
    /// Unset time fields are zero-filled for the conversion; the fields are
    /// interpreted as local wall-clock time (or UTC when `utc` is set, then
    /// converted to local), the daylight-saving flag is detected, and the
    /// originally-unset fields are put back to `None`.
    ///
    /// Returns `None` only for field combinations that do not name a valid
    /// calendar instant, which the parser rules out up front.
    fn resolve(
        year: i32,
        month: u32,
        day: u32,
        hour: Option<u32>,
        minute: Option<u32>,
        second: Option<u32>,
        utc: bool,
    ) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(
            hour.unwrap_or(0),
            minute.unwrap_or(0),
            second.unwrap_or(0),
        )?;

        let local: DateTime<Local> = if utc {
            chrono::Utc.from_utc_datetime(&naive).with_timezone(&Local)
        } else {
            match Local.from_local_datetime(&naive) {
                LocalResult::Single(dt) => dt,
                LocalResult::Ambiguous(earliest, _) => earliest,
                // Spring-forward gap: the wall-clock time does not exist,
                // push past the missing hour.
                LocalResult::None => Local
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()?,
            }
        };

        Some(Timestamp {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: hour.map(|_| local.hour()),
            minute: minute.map(|_| local.minute()),
            second: second.map(|_| local.second()),
            dst: if offset_is_dst(&local) { Dst::On } else { Dst::Off },
            utc,
        })
    }
}

/// UTC offset of local standard time for the given year, in seconds east.
///
/// Taking the smaller of the January and July offsets keeps the test
/// correct in both hemispheres.
fn standard_offset_secs(year: i32) -> i32 {
    let at = |month| {
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|dt| dt.offset().local_minus_utc())
    };
    match (at(1), at(7)) {
        (Some(jan), Some(jul)) => jan.min(jul),
        (Some(jan), None) => jan,
        (None, Some(jul)) => jul,
        (None, None) => 0,
    }
}

fn offset_is_dst(dt: &DateTime<Local>) -> bool {
    dt.offset().local_minus_utc() > standard_offset_secs(dt.year())
}
