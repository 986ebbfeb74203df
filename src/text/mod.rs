//! Plain-English date formatting, clock-time formatting, and
//! word-wrapped output for the command-line tools.

use chrono::NaiveDate;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ORDINALS: [&str; 31] = [
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
    "sixteenth",
    "seventeenth",
    "eighteenth",
    "nineteenth",
    "twentieth",
    "twenty-first",
    "twenty-second",
    "twenty-third",
    "twenty-fourth",
    "twenty-fifth",
    "twenty-sixth",
    "twenty-seventh",
    "twenty-eighth",
    "twenty-ninth",
    "thirtieth",
    "thirty-first",
];

/// English ordinal word for a day of the month (1-31)
pub fn ordinal(day: u32) -> &'static str {
    day.checked_sub(1)
        .and_then(|i| ORDINALS.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// A date as "Friday, November sixth, 1980"
pub fn date_text(year: i32, month: u32, day: u32) -> String {
    let weekday = NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.format("%A").to_string())
        .unwrap_or_default();
    let month_name = MONTH_NAMES
        .get(month as usize - 1)
        .copied()
        .unwrap_or_default();
    format!("{weekday}, {month_name} {}, {year}", ordinal(day))
}

/// A clock time as zero-padded `HH:MM[:SS]`, with an optional time zone
/// abbreviation appended. An unset seconds field is omitted.
pub fn time_text(hour: u32, minute: u32, second: Option<u32>, zone: Option<&str>) -> String {
    let mut out = format!("{hour:02}:{minute:02}");
    if let Some(second) = second {
        out.push_str(&format!(":{second:02}"));
    }
    if let Some(zone) = zone {
        out.push(' ');
        out.push_str(zone);
    }
    out
}

/// Greedy word-wrap to the given width; 0 disables wrapping. Explicit
/// newlines are preserved.
pub fn wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::new();
    for line in text.lines() {
        let mut col = 0;
        for word in line.split_whitespace() {
            if col > 0 {
                if col + 1 + word.len() > width {
                    out.push('\n');
                    col = 0;
                } else {
                    out.push(' ');
                    col += 1;
                }
            }
            out.push_str(word);
            col += word.len();
        }
        out.push('\n');
    }
    out
}
