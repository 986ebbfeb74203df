//! Solar ephemeris: sunrise, sunset, and the sun's position
//!
//! The method is the low-precision solar ephemeris from Duffett-Smith,
//! "Practical Astronomy With Your Calculator": solar ecliptic longitude by
//! Kepler iteration, conversion to equatorial coordinates, local sidereal
//! rise/set times for the day and the following day, interpolation between
//! the two, and a fixed refraction/solar-disc correction. The GMST and
//! alt-azimuth steps follow the Sky & Telescope (June 1984) formulation.

use thiserror::Error;

use crate::constants::{
    EPOCH_JD, MIN_YEAR, OBLIQUITY, RISE_SET_CORRECTION, SUN_ECLIPTIC_LONGITUDE_EPOCH,
    SUN_ORBIT_ECCENTRICITY, SUN_PERIGEE_LONGITUDE, TRANSIT_INTERVAL_HOURS, TROPICAL_YEAR_DAYS,
};
use crate::coordinates::{
    acos_deg, adj24, adj360, asin_deg, atan_q_deg, cos_deg, sin_deg, tan_deg,
};
use crate::location::Location;
use crate::timestamp::Timestamp;

/// Error type for the solar calculations
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolarError {
    /// The sun neither rises nor sets at this latitude on this date
    #[error("the sun is circumpolar at latitude {latitude}\u{b0} on this date")]
    Circumpolar {
        /// Observer latitude in degrees
        latitude: f64,
    },

    /// The Julian date conversion only covers the Gregorian calendar
    #[error("cannot handle dates before 1583 (got {year})")]
    DateRange {
        /// The offending year
        year: i32,
    },
}

/// Sunrise and sunset local times, rounded to the minute, with the
/// azimuths of the two events in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub rise_hour: u32,
    pub rise_minute: u32,
    pub set_hour: u32,
    pub set_minute: u32,
    pub rise_azimuth: f64,
    pub set_azimuth: f64,
}

/// Horizontal coordinates of the sun, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude: f64,
    pub azimuth: f64,
}

/// Compute the local sunrise and sunset times for the given date.
///
/// With no timestamp the current local date is used. The time zone is the
/// location's UTC offset, reduced by one hour when the date's
/// daylight-saving flag is on (auto-detected for `Dst::Unknown`).
pub fn rise_and_set(ts: Option<&Timestamp>, loc: &Location) -> Result<SunTimes, SolarError> {
    let now;
    let ts = match ts {
        Some(ts) => ts,
        None => {
            now = Timestamp::now();
            &now
        }
    };
    let tz = effective_utc_offset(ts, loc);
    let lat = loc.latitude;
    let lon = loc.longitude;

    let jd = julian_date(ts.month, ts.day, ts.year)?;
    let ed = jd - EPOCH_JD;

    let lambda1 = solar_lon(ed);
    let lambda2 = solar_lon(ed + 1.0);

    let (alpha1, delta1) = lon_to_eq(lambda1);
    let (alpha2, delta2) = lon_to_eq(lambda2);

    let (st1r, st1s, a1r, a1s) = rise_set_sidereal(alpha1, delta1, lat)?;
    let (st2r, st2s, a2r, a2s) = rise_set_sidereal(alpha2, delta2, lat)?;

    // Local sidereal time of midnight
    let m1 = adj24(gmst(jd - 0.5, 0.5 + f64::from(tz) / 24.0) - lon / 15.0);
    log::debug!("local sidereal time of midnight is {m1}");

    let trise = interpolate_transit(st1r, st2r, m1);
    let tset = interpolate_transit(st1s, st2s, m1);

    let ar = a1r * 360.0 / (360.0 + a1r - a2r);
    let as_ = a1s * 360.0 / (360.0 + a1s - a2s);

    let delta = (delta1 + delta2) / 2.0;
    let tri = acos_deg(sin_deg(lat) / cos_deg(delta));

    // Correction for refraction and the solar disc radius
    let x = RISE_SET_CORRECTION;
    let y = asin_deg(sin_deg(x) / sin_deg(tri));
    let da = asin_deg(tan_deg(x) / tan_deg(tri));
    let dt = 240.0 * y / cos_deg(delta) / 3600.0;
    log::debug!("corrections: dt = {dt}, da = {da}");

    let (rise_hour, rise_minute) = civil_hm(trise - dt, jd, ts.year, lon, tz)?;
    let (set_hour, set_minute) = civil_hm(tset + dt, jd, ts.year, lon, tz)?;

    Ok(SunTimes {
        rise_hour,
        rise_minute,
        set_hour,
        set_minute,
        rise_azimuth: ar - da,
        set_azimuth: as_ + da,
    })
}

/// Compute the sun's current altitude and azimuth for the given
/// date and time (or now).
pub fn position(ts: Option<&Timestamp>, loc: &Location) -> Result<Horizontal, SolarError> {
    let now;
    let ts = match ts {
        Some(ts) => ts,
        None => {
            now = Timestamp::now();
            &now
        }
    };
    let tz = effective_utc_offset(ts, loc);

    let jd = julian_date(ts.month, ts.day, ts.year)?;
    let ed = jd - EPOCH_JD;

    let (alpha1, delta1) = lon_to_eq(solar_lon(ed));
    let (alpha2, delta2) = lon_to_eq(solar_lon(ed + 1.0));
    let delta = (delta1 + delta2) / 2.0;

    let mut alpha = if alpha1 < alpha2 {
        (alpha1 + alpha2) / 2.0
    } else {
        (alpha1 + 24.0 + alpha2) / 2.0
    };
    if alpha > 24.0 {
        alpha -= 24.0;
    }

    let clock = hms_to_dh(
        ts.hour.unwrap_or(0),
        ts.minute.unwrap_or(0),
        ts.second.unwrap_or(0),
    );
    let mut dh = (clock + f64::from(tz)) / 24.0;
    let mut jd = jd;
    if dh > 0.5 {
        dh -= 0.5;
        jd += 0.5;
    } else {
        dh += 0.5;
        jd -= 0.5;
    }

    let gst = gmst(jd, dh);
    let (altitude, azimuth) = eq_to_altaz(alpha, delta, gst, loc.latitude, loc.longitude);
    Ok(Horizontal { altitude, azimuth })
}

/// UTC offset in hours west for this date, one less under DST
fn effective_utc_offset(ts: &Timestamp, loc: &Location) -> i32 {
    loc.utc_offset - i32::from(ts.dst_is_on())
}

/// Julian date of the given calendar day at 0h UT.
///
/// Only valid from 1583 on; `day` 0 is accepted as the day before the
/// first of the month.
pub fn julian_date(month: u32, day: u32, year: i32) -> Result<f64, SolarError> {
    let (mut year, mut month) = (i64::from(year), i64::from(month));
    if month == 1 || month == 2 {
        year -= 1;
        month += 12;
    }
    if year < i64::from(MIN_YEAR) {
        return Err(SolarError::DateRange { year: year as i32 });
    }
    let a = year / 100;
    let mut b = 2 - a + a / 4;
    b += (year as f64 * 365.25) as i64;
    b += (30.6001 * (month as f64 + 1.0)) as i64;
    let jd = f64::from(day) + b as f64 + 1_720_994.5;
    log::debug!("julian date for {month}/{day}/{year} is {jd}");
    Ok(jd)
}

/// Decimal hours from hour/minute/second
fn hms_to_dh(h: u32, m: u32, s: u32) -> f64 {
    f64::from(h) + f64::from(m) / 60.0 + f64::from(s) / 3600.0
}

/// Sun's ecliptic longitude `ed` days after the epoch, in degrees
fn solar_lon(ed: f64) -> f64 {
    let n = adj360(360.0 * ed / TROPICAL_YEAR_DAYS);
    let m = adj360(n + SUN_ECLIPTIC_LONGITUDE_EPOCH - SUN_PERIGEE_LONGITUDE).to_radians();

    // Kepler's equation by Newton's method
    let ect = SUN_ORBIT_ECCENTRICITY;
    let mut e = m;
    loop {
        let errt = e - ect * e.sin() - m;
        if errt <= 0.000_000_1 {
            break;
        }
        e -= errt / (1.0 - ect * e.cos());
    }

    let v = 2.0 * (1.016_860_1 * (e / 2.0).tan()).atan();
    adj360(v.to_degrees() + SUN_PERIGEE_LONGITUDE)
}

/// Ecliptic longitude to (right ascension in hours, declination in degrees)
fn lon_to_eq(lambda: f64) -> (f64, f64) {
    let tlam = lambda.to_radians();
    let epsilon = OBLIQUITY.to_radians();
    let alpha = atan_q_deg(tlam.sin() * epsilon.cos(), tlam.cos()) / 15.0;
    let delta = asin_deg(epsilon.sin() * tlam.sin());
    (alpha, delta)
}

/// Local sidereal times and azimuths of rising and setting.
///
/// Returns `(lst_rise, lst_set, azimuth_rise, azimuth_set)`; the
/// circumpolar condition is a dedicated error, never a bogus time.
fn rise_set_sidereal(
    alpha: f64,
    delta: f64,
    lat: f64,
) -> Result<(f64, f64, f64, f64), SolarError> {
    let tar = sin_deg(delta) / cos_deg(lat);
    if !(-1.0..=1.0).contains(&tar) {
        return Err(SolarError::Circumpolar { latitude: lat });
    }
    let ar = acos_deg(tar);
    let as_ = 360.0 - ar;

    let h = acos_deg(-tan_deg(lat) * tan_deg(delta)) / 15.0;
    let mut lstr = 24.0 + alpha - h;
    if lstr > 24.0 {
        lstr -= 24.0;
    }
    let mut lsts = alpha + h;
    if lsts > 24.0 {
        lsts -= 24.0;
    }
    Ok((lstr, lsts, ar, as_))
}

/// Interpolate a rise or set sidereal time between two consecutive days,
/// proportionally to how far the event falls into the day.
fn interpolate_transit(st1: f64, st2: f64, midnight_lst: f64) -> f64 {
    let hsm = adj24(st1 - midnight_lst);
    let ratio = hsm / TRANSIT_INTERVAL_HOURS;
    // A jump of more than an hour means the second day's angle wrapped
    // past the 24h boundary.
    let st2 = if (st2 - st1).abs() > 1.0 { st2 + 24.0 } else { st2 };
    adj24((1.0 - ratio) * st1 + ratio * st2)
}

/// Greenwich mean sidereal time for Julian date `j` and day fraction `f`
fn gmst(j: f64, f: f64) -> f64 {
    let d = j - 2_451_545.0;
    let t = d / 36_525.0;
    let t1 = t.floor();
    let j0 = t1 * 36_525.0 + 2_451_545.0;
    let t2 = (j - j0 + 0.5) / 36_525.0;
    let mut s = 24_110.548_41 + 184.812_866 * t1;
    s += 8_640_184.812_866 * t2;
    s += 0.093_104 * t * t;
    s -= 0.000_006_2 * t * t * t;
    s /= 86_400.0;
    s -= s.floor();
    s = 24.0 * (s + (f - 0.5) * 1.002_737_909);
    if s < 0.0 {
        s += 24.0;
    }
    if s > 24.0 {
        s -= 24.0;
    }
    s
}

/// Convert a local sidereal time to civil clock time, rounded to the
/// minute
fn civil_hm(lst: f64, jd: f64, year: i32, lon: f64, tz: i32) -> Result<(u32, u32), SolarError> {
    let mut gst = lst + lon / 15.0;
    if gst > 24.0 {
        gst -= 24.0;
    }
    let jan0 = julian_date(1, 0, year)?;
    let ed = jd - jan0;
    let t = (jan0 - 2_415_020.0) / 36_525.0;
    let r = 6.646_065_6 + 2_400.051_26 * t + 2.58e-5 * t * t;
    let b = 24.0 - (r - 24.0 * f64::from(year - 1900));
    let mut t0 = ed * 0.065_709_8 - b;
    if t0 < 0.0 {
        t0 += 24.0;
    }
    let mut gmt = gst - t0;
    if gmt < 0.0 {
        gmt += 24.0;
    }
    gmt = gmt * 0.997_27 - f64::from(tz);
    if gmt < 0.0 {
        gmt += 24.0;
    }
    let (h, m) = split_hm(gmt);
    Ok((h.max(0) as u32, m.max(0) as u32))
}

/// Split decimal hours (or degrees) into whole and minute parts, with
/// residual seconds above 30 rounding the minute up
pub fn split_hm(dh: f64) -> (i32, i32) {
    let mut h = dh.trunc() as i32;
    let frac_min = (dh - dh.trunc()) * 60.0;
    let mut m = frac_min.trunc() as i32;
    let tempsec = (frac_min - frac_min.trunc()) * 60.0 + 0.5;
    if tempsec > 30.0 {
        m += 1;
    }
    if m == 60 {
        m = 0;
        h += 1;
    }
    (h, m)
}

/// Equatorial (RA hours, declination degrees) to horizontal coordinates
/// at Greenwich sidereal time `t` hours
fn eq_to_altaz(r: f64, d: f64, t: f64, lat: f64, lon: f64) -> (f64, f64) {
    let b = lat.to_radians();
    let l = (360.0 - lon).to_radians();
    let r = (r * 15.0).to_radians();
    let d = d.to_radians();
    let t = (t * 15.0).to_radians();

    let t5 = t - r + l;
    let s1 = b.sin() * d.sin() + b.cos() * d.cos() * t5.cos();
    let c1 = 1.0 - s1 * s1;
    let h = if c1 > 0.0 {
        (s1 / c1.sqrt()).atan()
    } else {
        s1.signum() * std::f64::consts::FRAC_PI_2
    };

    let c2 = b.cos() * d.sin() - b.sin() * d.cos() * t5.cos();
    let s2 = -d.cos() * t5.sin();
    let mut a = if c2 == 0.0 {
        s2.signum() * std::f64::consts::FRAC_PI_2
    } else {
        let mut a = (s2 / c2).atan();
        if c2 < 0.0 {
            a += std::f64::consts::PI;
        }
        a
    };
    if a < 0.0 {
        a += 2.0 * std::f64::consts::PI;
    }
    (h.to_degrees(), a.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Dst;
    use approx::assert_relative_eq;

    fn date(year: i32, month: u32, day: u32) -> Timestamp {
        Timestamp {
            year,
            month,
            day,
            hour: None,
            minute: None,
            second: None,
            dst: Dst::Off,
            utc: false,
        }
    }

    fn equator() -> Location {
        Location {
            latitude: 0.0,
            longitude: 0.0,
            utc_offset: 0,
            ..Location::default()
        }
    }

    #[test]
    fn test_julian_date_values() {
        assert_relative_eq!(julian_date(1, 1, 2000).unwrap(), 2_451_544.5);
        assert_relative_eq!(julian_date(6, 21, 2020).unwrap(), 2_459_021.5);
        assert_relative_eq!(julian_date(11, 6, 1980).unwrap(), 2_444_549.5);
    }

    #[test]
    fn test_julian_date_rejects_pre_gregorian_years() {
        assert!(matches!(
            julian_date(1, 1, 1582),
            Err(SolarError::DateRange { .. })
        ));
        assert!(julian_date(3, 1, 1583).is_ok());
        // January and February count as months 13/14 of the previous
        // year, so the supported range starts in March 1583.
        assert!(matches!(
            julian_date(2, 28, 1583),
            Err(SolarError::DateRange { .. })
        ));
    }

    #[test]
    fn test_split_hm_rounding() {
        assert_eq!(split_hm(6.0), (6, 0));
        assert_eq!(split_hm(6.5), (6, 30));
        // 30.7 residual seconds round the minute up
        assert_eq!(split_hm(12.5084), (12, 31));
        // Rounding carries through the hour
        assert_eq!(split_hm(6.99999), (7, 0));
    }

    #[test]
    fn test_equator_equinox_day_is_about_twelve_hours() {
        let times = rise_and_set(Some(&date(2020, 3, 20)), &equator()).unwrap();
        let rise = times.rise_hour * 60 + times.rise_minute;
        let set = times.set_hour * 60 + times.set_minute;
        let daylight = set as i32 - rise as i32;
        // Twelve hours plus a few minutes of refraction
        assert!((710..=740).contains(&daylight), "daylight = {daylight} min");
    }

    #[test]
    fn test_arctic_summer_is_circumpolar() {
        let arctic = Location {
            latitude: 78.0,
            longitude: -15.0,
            utc_offset: -1,
            ..Location::default()
        };
        let result = rise_and_set(Some(&date(2020, 6, 21)), &arctic);
        assert!(matches!(result, Err(SolarError::Circumpolar { .. })));
    }

    #[test]
    fn test_midlatitude_summer_times_are_sane() {
        // Built-in Grenoble location, summer solstice
        let times = rise_and_set(Some(&date(2020, 6, 21)), &Location::default()).unwrap();
        assert!((3..=7).contains(&times.rise_hour), "rise {:02}:{:02}", times.rise_hour, times.rise_minute);
        assert!((19..=22).contains(&times.set_hour), "set {:02}:{:02}", times.set_hour, times.set_minute);
        assert!(times.rise_minute < 60 && times.set_minute < 60);
        // The sun rises north of east and sets north of west in summer
        assert!(times.rise_azimuth < 90.0);
        assert!(times.set_azimuth > 270.0);
    }

    #[test]
    fn test_winter_days_are_shorter_than_summer_days() {
        let loc = Location::default();
        let summer = rise_and_set(Some(&date(2020, 6, 21)), &loc).unwrap();
        let winter = rise_and_set(Some(&date(2020, 12, 21)), &loc).unwrap();
        let len = |t: &SunTimes| {
            (t.set_hour * 60 + t.set_minute) as i32 - (t.rise_hour * 60 + t.rise_minute) as i32
        };
        assert!(len(&summer) > len(&winter) + 120);
    }

    #[test]
    fn test_dst_shifts_the_clock_by_one_hour() {
        let loc = Location::default();
        let std_day = date(2020, 6, 21);
        let dst_day = Timestamp {
            dst: Dst::On,
            ..std_day.clone()
        };
        let std_times = rise_and_set(Some(&std_day), &loc).unwrap();
        let dst_times = rise_and_set(Some(&dst_day), &loc).unwrap();
        let minutes = |h: u32, m: u32| (h * 60 + m) as i32;
        let shift = minutes(dst_times.rise_hour, dst_times.rise_minute)
            - minutes(std_times.rise_hour, std_times.rise_minute);
        // The zone change also nudges the sidereal interpolation by a few
        // seconds, so the rounded shift may be off by a minute.
        assert!((59..=61).contains(&shift), "shift = {shift} min");
    }

    #[test]
    fn test_noon_sun_is_high_on_the_equinox_equator() {
        let mut ts = date(2020, 3, 20);
        ts.hour = Some(12);
        ts.minute = Some(7);
        let pos = position(Some(&ts), &equator()).unwrap();
        assert!(pos.altitude > 70.0, "altitude = {}", pos.altitude);
        assert!((0.0..360.0).contains(&pos.azimuth));
    }
}
