//! Almanac: date/time parsing, sunrise/sunset, and moon phase calculations
//!
//! This crate is the computational core behind a set of small
//! command-line tools (`today`, `localtime`, `potm`, `sunrise`,
//! `sunset`). It provides a flexible date/time text parser, a
//! low-precision solar ephemeris producing local sunrise and sunset
//! times, and a lunar phase calculator with an ASCII-art rendering of
//! the moon's disc. The solar and lunar methods follow Duffett-Smith,
//! "Practical Astronomy With Your Calculator".

use thiserror::Error;

pub mod constants;
pub mod coordinates;
pub mod location;
pub mod lunar;
pub mod solar;
pub mod text;
pub mod timestamp;

// Re-export commonly used types
pub use location::Location;
pub use lunar::{MoonPhase, Phase};
pub use solar::{Horizontal, SunTimes};
pub use timestamp::{Dst, Timestamp};

/// Main error type for the almanac library
#[derive(Debug, Error)]
pub enum AlmanacError {
    #[error("Parse error: {0}")]
    Parse(#[from] timestamp::ParseError),

    #[error("Solar error: {0}")]
    Solar(#[from] solar::SolarError),

    #[error("Configuration error: {0}")]
    Config(#[from] location::ConfigError),

    #[error("Rendering error: {0}")]
    Art(#[from] lunar::ArtError),
}

/// Result type for almanac operations
pub type Result<T> = std::result::Result<T, AlmanacError>;
