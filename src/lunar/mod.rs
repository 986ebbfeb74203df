//! Lunar phase calculations
//!
//! Based on the routines in "Practical Astronomy with Your Calculator"
//! (Duffett-Smith); the orbital-element chain follows sections 42, 61,
//! and 63 of the book.

use std::f64::consts::PI;
use std::fmt;

use crate::constants::{
    EPOCH, MOON_MEAN_LONGITUDE_EPOCH, MOON_PERIGEE_LONGITUDE_EPOCH,
    SUN_ECLIPTIC_LONGITUDE_EPOCH, SUN_ORBIT_ECCENTRICITY, SUN_PERIGEE_LONGITUDE,
    TROPICAL_YEAR_DAYS,
};
use crate::coordinates::adj360;
use crate::timestamp::{is_leap_year, Timestamp};

mod art;

pub use art::{render, ArtError};

/// The eight principal phases of the moon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

/// Illumination and phase of the moon at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPhase {
    /// Percentage of the lunar surface illuminated, 0-100
    pub illumination: f64,
    /// Phase label derived from the rounded illumination
    pub phase: Phase,
    /// Whether the illumination is increasing (ascendant trend)
    pub waxing: bool,
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::Full => write!(f, "Full"),
            Phase::New => write!(f, "New"),
            Phase::FirstQuarter => write!(f, "at the First Quarter"),
            Phase::LastQuarter => write!(f, "at the Last Quarter"),
            Phase::WaxingGibbous => {
                write!(f, "Waxing Gibbous ({:.0}% of Full)", self.illumination)
            }
            Phase::WaningGibbous => {
                write!(f, "Waning Gibbous ({:.0}% of Full)", self.illumination)
            }
            Phase::WaxingCrescent => {
                write!(f, "Waxing Crescent ({:.0}% of Full)", self.illumination)
            }
            Phase::WaningCrescent => {
                write!(f, "Waning Crescent ({:.0}% of Full)", self.illumination)
            }
        }
    }
}

/// Describe the phase of the moon at the given time, or now.
pub fn describe(ts: Option<&Timestamp>) -> MoonPhase {
    let now;
    let ts = match ts {
        Some(ts) => ts,
        None => {
            now = Timestamp::now();
            &now
        }
    };
    let days = days_since_epoch(ts);
    let phase = illuminated_percent(days);
    let next = illuminated_percent(days + 1.0);
    let waxing = next > phase;
    log::debug!("the moon is {:.0}% full after {days} epoch days", phase);

    MoonPhase {
        illumination: phase,
        phase: classify(rounded(phase), waxing),
        waxing,
    }
}

/// Percentage of the lunar surface illuminated at the given time.
pub fn illumination(ts: &Timestamp) -> f64 {
    illuminated_percent(days_since_epoch(ts))
}

fn rounded(phase: f64) -> i64 {
    (phase + 0.5) as i64
}

fn classify(rounded: i64, waxing: bool) -> Phase {
    match rounded {
        100 => Phase::Full,
        0 => Phase::New,
        50 if waxing => Phase::FirstQuarter,
        50 => Phase::LastQuarter,
        r if r > 50 => {
            if waxing {
                Phase::WaxingGibbous
            } else {
                Phase::WaningGibbous
            }
        }
        _ => {
            if waxing {
                Phase::WaxingCrescent
            } else {
                Phase::WaningCrescent
            }
        }
    }
}

/// Days elapsed since the 1980.0 epoch, including the fractional
/// time of day
fn days_since_epoch(ts: &Timestamp) -> f64 {
    let time_of_day = (f64::from(ts.hour.unwrap_or(0))
        + f64::from(ts.minute.unwrap_or(0)) / 60.0
        + f64::from(ts.second.unwrap_or(0)) / 3600.0)
        / 24.0;
    let mut days = f64::from(ts.day_of_year()) + time_of_day;
    for year in EPOCH..ts.year {
        days += 365.0 + f64::from(u8::from(is_leap_year(year)));
    }
    days
}

/// Illuminated percentage of the moon `days` days after the epoch.
///
/// The section numbers refer to Duffett-Smith.
fn illuminated_percent(days: f64) -> f64 {
    // Sun's position (sec 42)
    let n = adj360(360.0 * days / TROPICAL_YEAR_DAYS);
    let msol = adj360(n + SUN_ECLIPTIC_LONGITUDE_EPOCH - SUN_PERIGEE_LONGITUDE);
    let ec = 360.0 / PI * SUN_ORBIT_ECCENTRICITY * msol.to_radians().sin();
    let lambda_sol = adj360(n + ec + SUN_ECLIPTIC_LONGITUDE_EPOCH);

    // Moon's mean longitude and anomaly (sec 61)
    let l = adj360(13.176_396_6 * days + MOON_MEAN_LONGITUDE_EPOCH);
    let mm = adj360(l - 0.111_404_1 * days - MOON_PERIGEE_LONGITUDE_EPOCH);

    // Evection, annual equation, third correction
    let ev = 1.2739 * (2.0 * (l - lambda_sol) - mm).to_radians().sin();
    let ac = 0.1858 * msol.to_radians().sin();
    let a3 = 0.37 * msol.to_radians().sin();
    let mm_prime = mm + ev - ac - a3;

    // Equation of the centre, fourth correction, variation
    let ec = 6.2886 * mm_prime.to_radians().sin();
    let a4 = 0.214 * (2.0 * mm_prime).to_radians().sin();
    let l_prime = l + ev + ec - ac + a4;
    let v = 0.6583 * (2.0 * (l_prime - lambda_sol)).to_radians().sin();
    let ld_prime = l_prime + v;

    // Moon's age and illuminated fraction (sec 63)
    let d = ld_prime - lambda_sol;
    50.0 * (1.0 - d.to_radians().cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Dst;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> Timestamp {
        Timestamp {
            year,
            month,
            day,
            hour: Some(hour),
            minute: Some(0),
            second: Some(0),
            dst: Dst::Off,
            utc: false,
        }
    }

    #[test]
    fn test_illumination_is_bounded() {
        let mut days = 0.0;
        while days < 20_000.0 {
            let phase = illuminated_percent(days);
            assert!((0.0..=100.0).contains(&phase), "phase {phase} at {days}");
            days += 13.7;
        }
    }

    #[test]
    fn test_full_moon_2020_01_10() {
        // Full moon was 2020-01-10 19:21 UTC
        let phase = describe(Some(&at(2020, 1, 10, 19)));
        assert_eq!(phase.phase, Phase::Full);
        assert!(phase.illumination > 99.0);
    }

    #[test]
    fn test_new_moon_2019_11_26() {
        // New moon was 2019-11-26 15:06 UTC
        let phase = describe(Some(&at(2019, 11, 26, 15)));
        assert_eq!(phase.phase, Phase::New);
        assert!(phase.illumination < 1.0);
    }

    #[test]
    fn test_trend_around_the_full_moon() {
        let before = describe(Some(&at(2020, 1, 6, 0)));
        assert!(before.waxing);
        let after = describe(Some(&at(2020, 1, 15, 0)));
        assert!(!after.waxing);
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify(100, false), Phase::Full);
        assert_eq!(classify(0, true), Phase::New);
        assert_eq!(classify(50, true), Phase::FirstQuarter);
        assert_eq!(classify(50, false), Phase::LastQuarter);
        assert_eq!(classify(75, true), Phase::WaxingGibbous);
        assert_eq!(classify(75, false), Phase::WaningGibbous);
        assert_eq!(classify(25, true), Phase::WaxingCrescent);
        assert_eq!(classify(25, false), Phase::WaningCrescent);
    }

    #[test]
    fn test_full_label_only_at_rounded_100() {
        // Scan a lunation; "Full" must coincide exactly with a rounded
        // illumination of 100, "New" with 0.
        for day in 1..=28 {
            let ts = at(2020, 2, day, 12);
            let phase = describe(Some(&ts));
            let r = rounded(phase.illumination);
            assert_eq!(phase.phase == Phase::Full, r == 100, "day {day}");
            assert_eq!(phase.phase == Phase::New, r == 0, "day {day}");
        }
    }

    #[test]
    fn test_display_strings() {
        let gibbous = MoonPhase {
            illumination: 62.4,
            phase: Phase::WaxingGibbous,
            waxing: true,
        };
        assert_eq!(gibbous.to_string(), "Waxing Gibbous (62% of Full)");

        let quarter = MoonPhase {
            illumination: 49.9,
            phase: Phase::LastQuarter,
            waxing: false,
        };
        assert_eq!(quarter.to_string(), "at the Last Quarter");
    }
}
