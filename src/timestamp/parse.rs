//! Date/time text parser
//!
//! Fields can be omitted from the right: `801106` is a bare date,
//! `8011061104` adds a time, `2018-12-25T23:59:59Z` is the full dashed
//! form. Separators between numeric fields are skipped, so inputs like
//! `78.04.22` or `2018-12-25 23h59m59` parse as well.

use chrono::{Datelike, Local};

use super::{days_in_month, is_leap_year, ParseError, Timestamp};

/// Byte cursor over the trimmed input with `getval`-style field reads
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_non_digits(&mut self) {
        while matches!(self.peek(), Some(b) if !b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// Length of the run of consecutive digits at the cursor
    fn digit_run_len(&self) -> usize {
        self.bytes[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    }

    /// Read a 2-digit value in [low, high]; preceding non-digits are
    /// skipped. Errors carry the 1-based offset of the first bad character
    /// (the field start for an out-of-range value).
    fn required(&mut self, low: u32, high: u32) -> Result<u32, ParseError> {
        self.skip_non_digits();
        match self.read_two_digits()? {
            value if (low..=high).contains(&value) => Ok(value),
            _ => Err(ParseError {
                offset: self.pos - 1,
            }),
        }
    }

    /// Like `required`, but an exhausted input yields `None` instead of
    /// an error, leaving the field unset.
    fn optional(&mut self, low: u32, high: u32) -> Result<Option<u32>, ParseError> {
        self.skip_non_digits();
        if self.peek().is_none() {
            return Ok(None);
        }
        self.required(low, high).map(Some)
    }

    fn read_two_digits(&mut self) -> Result<u32, ParseError> {
        let mut value = 0;
        for _ in 0..2 {
            match self.peek() {
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + u32::from(b - b'0');
                    self.pos += 1;
                }
                _ => {
                    return Err(ParseError {
                        offset: self.pos + 1,
                    })
                }
            }
        }
        Ok(value)
    }

    /// Read a 3-digit day-of-year ordinal; the caller has verified the run
    /// length, so only the range can fail.
    fn read_ordinal(&mut self, high: u32) -> Result<u32, ParseError> {
        let start = self.pos;
        let mut value = 0;
        for _ in 0..3 {
            value = value * 10 + u32::from(self.bytes[self.pos] - b'0');
            self.pos += 1;
        }
        if (1..=high).contains(&value) {
            Ok(value)
        } else {
            Err(ParseError { offset: start + 1 })
        }
    }
}

pub(super) fn parse(text: &str) -> Result<Timestamp, ParseError> {
    let mut s = text.trim();
    log::debug!("parsing date/time text {s:?}");

    let mut utc = false;
    if let Some(stripped) = s.strip_suffix(['z', 'Z']) {
        utc = true;
        s = stripped;
    }
    let bytes = s.as_bytes();
    let mut cur = Cursor::new(bytes);

    // A 2-digit prefix followed by ':' or 'h' is a bare time of day;
    // the date defaults to the current local day.
    let bare_time = bytes.len() >= 3
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && matches!(bytes[2], b':' | b'h' | b'H');

    let (year, month, day) = if bare_time {
        let today = Local::now();
        (today.year(), today.month(), today.day())
    } else {
        parse_date(&mut cur, bytes)?
    };

    let hour = cur.optional(0, 23)?;
    let minute = cur.optional(0, 59)?;
    let second = cur.optional(0, 59)?;

    Timestamp::resolve(year, month, day, hour, minute, second, utc)
        .ok_or(ParseError { offset: 1 })
}

fn parse_date(cur: &mut Cursor, bytes: &[u8]) -> Result<(i32, u32, u32), ParseError> {
    // A leading '+' announces an explicit 2-digit century; a '-' in the
    // fifth position means a 4-digit year was given.
    let mut has_century = false;
    if cur.peek() == Some(b'+') {
        cur.pos += 1;
        has_century = true;
    } else if bytes.len() > 4 && bytes[4] == b'-' {
        has_century = true;
    }

    let mut epoch = 1900;
    if has_century {
        epoch = cur.required(0, 99)? as i32 * 100;
    }
    let yy = cur.required(0, 99)? as i32;
    if !has_century && yy < 70 {
        // The classic pivot: two-digit years below 70 are in the 2000s.
        epoch = 2000;
    }
    let year = epoch + yy;

    cur.skip_non_digits();
    if cur.digit_run_len() == 3 {
        // Exactly three digits after the year: an ISO day-of-year ordinal.
        let high = if is_leap_year(year) { 366 } else { 365 };
        let ordinal = cur.read_ordinal(high)?;
        let (month, day) = month_day_from_ordinal(year, ordinal);
        return Ok((year, month, day));
    }

    let month = cur.required(1, 12)?;
    let day = cur.required(1, days_in_month(year, month))?;
    Ok((year, month, day))
}

/// Convert a validated day-of-year ordinal to month and day
fn month_day_from_ordinal(year: i32, ordinal: u32) -> (u32, u32) {
    let mut remaining = ordinal;
    for month in 1..=12 {
        let len = days_in_month(year, month);
        if remaining <= len {
            return (month, remaining);
        }
        remaining -= len;
    }
    (12, 31)
}

#[cfg(test)]
mod tests {
    use super::super::Dst;
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};
    use rstest::rstest;

    fn date_of(ts: &Timestamp) -> (i32, u32, u32) {
        (ts.year, ts.month, ts.day)
    }

    #[rstest]
    #[case("2019-11-03", (2019, 11, 3))]
    #[case("801106", (1980, 11, 6))]
    #[case("80-11-06", (1980, 11, 6))]
    #[case("691106", (2069, 11, 6))]
    #[case("701106", (1970, 11, 6))]
    #[case("+18801106", (1880, 11, 6))]
    #[case("+1776.07.04", (1776, 7, 4))]
    #[case("2019-1231", (2019, 12, 31))]
    #[case("  2019-01-02  ", (2019, 1, 2))]
    fn test_parse_dates(#[case] text: &str, #[case] expected: (i32, u32, u32)) {
        let ts = Timestamp::parse(text).unwrap();
        assert_eq!(date_of(&ts), expected);
        assert_eq!(ts.hour, None);
        assert_eq!(ts.minute, None);
        assert_eq!(ts.second, None);
        assert_ne!(ts.dst, Dst::Unknown);
    }

    #[rstest]
    #[case("2019-060", (2019, 3, 1))]
    #[case("2020-060", (2020, 2, 29))]
    #[case("2019-001", (2019, 1, 1))]
    #[case("2019-365", (2019, 12, 31))]
    #[case("2020-366", (2020, 12, 31))]
    fn test_parse_day_of_year(#[case] text: &str, #[case] expected: (i32, u32, u32)) {
        let ts = Timestamp::parse(text).unwrap();
        assert_eq!(date_of(&ts), expected);
    }

    #[test]
    fn test_day_of_year_agrees_with_month_walk() {
        for &year in &[2019, 2020] {
            let days = if is_leap_year(year) { 366 } else { 365 };
            let mut month = 1;
            let mut day = 0;
            for ordinal in 1..=days {
                day += 1;
                if day > days_in_month(year, month) {
                    month += 1;
                    day = 1;
                }
                let ts = Timestamp::parse(&format!("{year}-{ordinal:03}")).unwrap();
                assert_eq!(date_of(&ts), (year, month, day), "ordinal {ordinal}");
            }
        }
    }

    #[rstest]
    #[case("2018-12-25T23:59", (Some(23), Some(59), None))]
    #[case("2018-12-25 23h59m59", (Some(23), Some(59), Some(59)))]
    #[case("8011061104", (Some(11), Some(4), None))]
    #[case("801106110402", (Some(11), Some(4), Some(2)))]
    #[case("2018-12-25T23", (Some(23), None, None))]
    fn test_parse_times(#[case] text: &str, #[case] expected: (Option<u32>, Option<u32>, Option<u32>)) {
        let ts = Timestamp::parse(text).unwrap();
        assert_eq!((ts.hour, ts.minute, ts.second), expected);
    }

    #[test]
    fn test_parse_round_trip() {
        for text in ["2019-11-03", "1984-02-29", "2020-12-31"] {
            let ts = Timestamp::parse(text).unwrap();
            assert_eq!(ts.format_date(), text);
        }
    }

    #[test]
    fn test_bare_time_defaults_to_today() {
        let before = Local::now();
        let ts = Timestamp::parse("23:59").unwrap();
        let after = Local::now();

        assert!(
            date_of(&ts) == (before.year(), before.month(), before.day())
                || date_of(&ts) == (after.year(), after.month(), after.day())
        );
        assert_eq!(ts.hour, Some(23));
        assert_eq!(ts.minute, Some(59));
        assert_eq!(ts.second, None);
    }

    #[test]
    fn test_bare_time_with_h_separator() {
        let ts = Timestamp::parse("12h30").unwrap();
        assert_eq!((ts.hour, ts.minute, ts.second), (Some(12), Some(30), None));
    }

    #[test]
    fn test_utc_marker() {
        let z = Timestamp::parse("2018-12-25T23:59Z").unwrap();
        assert!(z.utc);
        assert_eq!(z.second, None);

        let expected = Utc
            .with_ymd_and_hms(2018, 12, 25, 23, 59, 0)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(date_of(&z), (expected.year(), expected.month(), expected.day()));
        assert_eq!(z.hour, Some(expected.hour()));
        assert_eq!(z.minute, Some(expected.minute()));

        // Without the marker the clock digits are taken as local time.
        let local = Timestamp::parse("2018-12-25T23:59").unwrap();
        assert!(!local.utc);
        assert_eq!(date_of(&local), (2018, 12, 25));
        assert_eq!((local.hour, local.minute), (Some(23), Some(59)));
    }

    #[rstest]
    #[case("2019-13-01")]
    #[case("2019-02-30")]
    #[case("2019-00-10")]
    #[case("2019-366")]
    #[case("2021-366")]
    #[case("2019-000")]
    #[case("garbage")]
    #[case("2019")]
    #[case("2019-06-0")]
    #[case("2h30")]
    #[case("2018-12-25T25:00")]
    #[case("23:61")]
    fn test_parse_errors(#[case] text: &str) {
        assert!(Timestamp::parse(text).is_err());
    }

    #[test]
    fn test_error_offset_points_at_bad_field() {
        // Month 13 starts at offset 6 of "2019-13-01".
        let err = Timestamp::parse("2019-13-01").unwrap_err();
        assert_eq!(err.offset, 6);

        // A two-digit run where three were possible is month+day, so the
        // short day field fails right after its single digit.
        let err = Timestamp::parse("2019-06-0").unwrap_err();
        assert_eq!(err.offset, 10);
    }

    #[test]
    fn test_leap_day_only_in_leap_years() {
        assert!(Timestamp::parse("2020-02-29").is_ok());
        assert!(Timestamp::parse("2019-02-29").is_err());
        assert!(Timestamp::parse("2000-02-29").is_ok());
    }
}
