//! Observer location parameters and their configuration sources
//!
//! A [`Location`] starts from built-in defaults and is refined by an
//! ordered merge: system config file, then user config file, then an
//! explicitly-named file, then environment variables. Missing default
//! files are silently skipped; an explicitly-named file that cannot be
//! read is an error.
//!
//! Config files hold one `KEY = value` pair per line. `#` and `//` start
//! trailing comments, underscores in keys are ignored (so `COUNTRY_CODE`
//! and `COUNTRYCODE` are equivalent), and keys are case-insensitive.
//! Note that file and environment longitudes use the common +east
//! convention and are negated on the way in; the rest of the crate works
//! in degrees west.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for location configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly-named configuration file could not be read
    #[error("cannot read configuration file {path:?}: {source}")]
    FileError {
        /// The path of the file that caused the error
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

/// The configuration keys recognized in files and the environment
const KEYS: [&str; 8] = [
    "LATITUDE",
    "LONGITUDE",
    "CITY",
    "TZABBR",
    "DSTZABBR",
    "COUNTRYCODE",
    "COUNTRYNAME",
    "REGIONCODE",
];

/// Geographic and time-zone parameters of the observer
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Latitude in degrees, positive north
    pub latitude: f64,
    /// Longitude in degrees, positive west
    pub longitude: f64,
    /// Time zone as hours west of UTC; reduce by one under DST
    pub utc_offset: i32,
    /// Display name of the place
    pub city: String,
    /// Standard time zone abbreviation
    pub tz_abbr: String,
    /// Daylight-saving time zone abbreviation
    pub dst_abbr: String,
    /// Two-letter country code
    pub country_code: String,
    /// Country name
    pub country_name: String,
    /// Region or state code
    pub region_code: String,
}

impl Default for Location {
    /// Built-in settings for Grenoble, France
    fn default() -> Self {
        Location {
            latitude: 45.192_660,
            longitude: -5.727_764,
            utc_offset: -1,
            city: "Grenoble, France".to_string(),
            tz_abbr: "CET".to_string(),
            dst_abbr: "CEST".to_string(),
            country_code: String::new(),
            country_name: String::new(),
            region_code: String::new(),
        }
    }
}

impl Location {
    /// Resolve the location from defaults, config files, and the process
    /// environment.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve_with_env(explicit, &|name| std::env::var(name).ok())
    }

    /// Like [`Location::resolve`] with an injectable environment lookup.
    pub fn resolve_with_env(
        explicit: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut loc = Location::default();

        for path in [system_config_file(), user_config_file()].into_iter().flatten() {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    log::debug!("reading location settings from {}", path.display());
                    loc.apply_text(&text);
                }
                Err(_) => log::debug!("no location settings at {}", path.display()),
            }
        }

        if let Some(path) = explicit {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::FileError {
                path: path.to_path_buf(),
                source,
            })?;
            log::debug!("reading location settings from {}", path.display());
            loc.apply_text(&text);
        }

        for key in KEYS {
            if let Some(value) = env(key) {
                loc.apply(key, &value);
            }
        }

        loc.build_city_label();
        Ok(loc)
    }

    /// Apply every `KEY = value` line of a config file
    fn apply_text(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim_start();
            if line.is_empty() {
                continue;
            }
            let key_end = line.find([' ', '\t', '=']).unwrap_or(line.len());
            let (raw_key, rest) = line.split_at(key_end);
            let value = rest.trim_start_matches([' ', '\t', '=']);
            let value = value.split('#').next().unwrap_or(value);
            let value = match value.find("//") {
                Some(i) => &value[..i],
                None => value,
            };
            let key: String = raw_key
                .chars()
                .filter(|c| *c != '_')
                .collect::<String>()
                .to_ascii_uppercase();
            self.apply(&key, value.trim_end());
        }
    }

    /// Apply one canonical key; unknown keys and bad numbers are ignored
    fn apply(&mut self, key: &str, value: &str) {
        log::debug!("location setting {key} = {value:?}");
        match key {
            "LATITUDE" => {
                if let Ok(v) = value.trim().parse() {
                    self.latitude = v;
                }
            }
            "LONGITUDE" => {
                // Config longitudes are +east; internally + means west.
                if let Ok(v) = value.trim().parse::<f64>() {
                    self.longitude = -v;
                }
            }
            "CITY" => self.city = value.to_string(),
            "TZABBR" => self.tz_abbr = value.to_string(),
            "DSTZABBR" => self.dst_abbr = value.to_string(),
            "COUNTRYCODE" => self.country_code = value.to_string(),
            "COUNTRYNAME" => self.country_name = value.to_string(),
            "REGIONCODE" => self.region_code = value.to_string(),
            _ => {}
        }
    }

    /// Extend the city label with region and country information
    fn build_city_label(&mut self) {
        if self.country_code.eq_ignore_ascii_case("US") {
            if self.region_code.is_empty() {
                self.city.push_str(", USA");
            } else {
                self.city.push_str(&format!(", {}, USA", self.region_code));
            }
        } else if !self.country_name.is_empty() {
            self.city.push_str(&format!(", {}", self.country_name));
        }
    }
}

#[cfg(not(windows))]
fn system_config_file() -> Option<PathBuf> {
    Some(PathBuf::from("/etc/location.conf"))
}

#[cfg(windows)]
fn system_config_file() -> Option<PathBuf> {
    std::env::var_os("windir").map(|dir| PathBuf::from(dir).join("location.inf"))
}

#[cfg(not(windows))]
fn user_config_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".location"))
}

#[cfg(windows)]
fn user_config_file() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(|home| PathBuf::from(home).join("location.inf"))
}
