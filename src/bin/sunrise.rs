//! Display the sunrise time
//!
//! Usage:
//!   sunrise                   today's sunrise as HH:MM
//!   sunrise 2019-11-03        sunrise on a given date
//!   sunrise -1:30             one hour and a half before sunrise
//!   sunrise +0:45 2019-060    45 minutes after sunrise on a day-of-year

use std::path::PathBuf;

use clap::Parser;

use almanac::{solar, Location, Timestamp};

/// Display the sunrise time
#[derive(Parser, Debug)]
#[command(version, about = "Display the sunrise time", long_about = None)]
struct Args {
    /// Configuration file name
    #[arg(short, long, value_name = "PATHNAME")]
    config: Option<PathBuf>,

    /// Display the full date/time in the canonic ISO 8601 format
    #[arg(short, long)]
    full: bool,

    /// Display the place name and full date/time
    #[arg(short, long)]
    verbose: bool,

    /// Also display the sunrise azimuth and the sun's current position
    #[arg(short, long)]
    position: bool,

    /// Print diagnostics to stderr
    #[arg(short, long)]
    debug: bool,

    /// DATE (YYYY-MM-DD or YYYY-DDD, default today) and/or a +H[:M] or
    /// -H[:M] offset from sunrise
    #[arg(allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    let mut offset = (0, 0);
    let mut ts: Option<Timestamp> = None;
    for arg in &args.args {
        if let Some(parsed) = parse_offset(arg) {
            offset = parsed;
            continue;
        }
        match Timestamp::parse(arg) {
            Ok(parsed) => ts = Some(parsed),
            Err(_) => {
                eprintln!("Error: Invalid argument: '{arg}'");
                std::process::exit(1);
            }
        }
    }

    let loc = match Location::resolve(args.config.as_deref()) {
        Ok(loc) => loc,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let times = match solar::rise_and_set(ts.as_ref(), &loc) {
        Ok(times) => times,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let (hour, minute) = apply_offset(times.rise_hour, times.rise_minute, offset);

    let shown = ts.clone().unwrap_or_else(Timestamp::now);
    if args.verbose {
        print!("Sunrise in {}, on {}, is at ", loc.city, shown.format_date());
    } else if args.full {
        print!("{} ", shown.format_date());
    }
    print!("{hour:02}:{minute:02}");
    if args.verbose {
        let zone = if shown.dst_is_on() { &loc.dst_abbr } else { &loc.tz_abbr };
        print!(" {zone}");
    }
    println!();

    if args.position {
        let (az_deg, az_min) = solar::split_hm(times.rise_azimuth);
        println!("Azimuth: {az_deg:3} {az_min:02}'");
        match solar::position(ts.as_ref(), &loc) {
            Ok(pos) => {
                let (az_d, az_m) = solar::split_hm(pos.azimuth);
                let (alt_d, alt_m) = solar::split_hm(pos.altitude);
                println!("The sun is at:   Azimuth: {az_d:3} {az_m:02}'  Altitude: {alt_d:3} {alt_m:02}'");
            }
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    }
}

/// Parse a `+H[:M]` or `-H[:M]` offset argument. The hour part is limited
/// to two digits so that compact `+CCYYMMDD` dates are not mistaken for
/// offsets.
fn parse_offset(arg: &str) -> Option<(i32, i32)> {
    let (sign, rest) = match arg.strip_prefix('+') {
        Some(rest) => (1, rest),
        None => (-1, arg.strip_prefix('-')?),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    if hours.is_empty() || hours.len() > 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    Some((sign * hours, sign * minutes))
}

/// Add an hour/minute offset to a clock time, carrying minutes
fn apply_offset(hour: u32, minute: u32, offset: (i32, i32)) -> (i32, i32) {
    let mut hour = hour as i32;
    let mut minute = minute as i32 + offset.1;
    if minute < 0 {
        minute += 60;
        hour -= 1;
    } else if minute >= 60 {
        minute -= 60;
        hour += 1;
    }
    (hour + offset.0, minute)
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
