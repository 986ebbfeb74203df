//! Print the date, time, sunrise/sunset, and phase of the moon in
//! plain English
//!
//! Usage:
//!   today                     "Today is Friday, November sixth, 1980. ..."
//!   today -a 2019-11-03       everything about a given date
//!   today -x                  read dates from standard input
//!
//! Dates use ISO numeric notation, compact ("801106", optionally with a
//! "+CC" century and a time suffix) or dashed ("2019-11-03T23:59"), plus
//! the day-of-year form "2019-060".

use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;

use almanac::{lunar, solar, text, Location, Timestamp};

const MAX_LINE_WIDTH: usize = 256;

/// Print the date and time in plain English
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Print the date, time, sunrise, sunset and phase of the moon in plain English",
    long_about = None
)]
struct Args {
    /// Print all details; implies -m and -s
    #[arg(short, long)]
    all: bool,

    /// Configuration file name
    #[arg(short, long, value_name = "PATHNAME")]
    config: Option<PathBuf>,

    /// Also print the moon phase
    #[arg(short, long)]
    moon: bool,

    /// Quiet mode: print just the bare date
    #[arg(short, long)]
    quiet: bool,

    /// Also print sunrise and sunset
    #[arg(short, long)]
    sun: bool,

    /// Verbose mode; implies -s
    #[arg(short, long)]
    verbose: bool,

    /// Set the line width; 0 = unlimited. Default: screen width
    #[arg(short, long, value_name = "WIDTH")]
    width: Option<usize>,

    /// Print diagnostics to stderr
    #[arg(short, long)]
    debug: bool,

    /// Read dates from standard input
    #[arg(short = 'x', long = "stdin")]
    from_stdin: bool,

    /// Dates to print: [+CC]YY[-]MM[-]DD[THH[:MM[:SS]]][Z] or YYYY-DDD
    dates: Vec<String>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    let width = match args.width {
        Some(w) if w == 0 || w <= MAX_LINE_WIDTH => w,
        Some(_) => MAX_LINE_WIDTH,
        None => term_size::dimensions()
            .map(|(w, _)| w.saturating_sub(1).min(MAX_LINE_WIDTH))
            .unwrap_or(72),
    };

    let loc = match Location::resolve(args.config.as_deref()) {
        Ok(loc) => loc,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if args.from_stdin {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            process_text(&line, &loc, &args, width);
        }
        return;
    }

    let mut done = false;
    for date in &args.dates {
        if process_text(date, &loc, &args, width) {
            done = true;
        }
    }
    if !done {
        process(&Timestamp::now(), &loc, &args, width);
    }
}

/// Parse one date argument and print its information; reports errors
/// with the offending prefix of the text.
fn process_text(date: &str, loc: &Location, args: &Args, width: usize) -> bool {
    match Timestamp::parse(date) {
        Ok(ts) => {
            process(&ts, loc, args, width);
            true
        }
        Err(err) => {
            let trimmed = date.trim();
            let end = (err.offset - 1).min(trimmed.len());
            let scanned = trimmed.get(..end).unwrap_or(trimmed);
            println!("Bad parameters or date out of range in \"{date}\" after scanning \"{scanned}\".");
            false
        }
    }
}

/// Print everything requested about one timestamp
fn process(ts: &Timestamp, loc: &Location, args: &Args, width: usize) {
    let show_sun = args.sun || args.verbose || args.all;
    let show_moon = args.moon || args.all;
    let now = Timestamp::now();

    let mut out = String::new();
    if !args.quiet {
        if (ts.year, ts.month, ts.day) == (now.year, now.month, now.day) {
            out.push_str("Today is ");
        } else {
            out.push_str(&format!("{} is ", ts.format_date()));
        }
    }
    out.push_str(&text::date_text(ts.year, ts.month, ts.day));
    out.push_str(".\n");

    if args.quiet {
        print!("{}", text::wrap(&out, width));
        return;
    }

    if let Some(hour) = ts.hour {
        let zone = if ts.dst_is_on() { &loc.dst_abbr } else { &loc.tz_abbr };
        out.push_str("The time is ");
        out.push_str(&text::time_text(
            hour,
            ts.minute.unwrap_or(0),
            ts.second,
            Some(zone.as_str()),
        ));
        out.push_str(".\n");
    }

    if show_sun {
        match solar::rise_and_set(Some(ts), loc) {
            Ok(times) => {
                out.push_str(&format!("In {},\n", loc.city));
                out.push_str(&format!(
                    "Sunrise is at {}.\n",
                    text::time_text(times.rise_hour, times.rise_minute, None, None)
                ));
                out.push_str(&format!(
                    "Sunset is at {}.\n",
                    text::time_text(times.set_hour, times.set_minute, None, None)
                ));
            }
            Err(err) => {
                print!("{}", text::wrap(&out, width));
                eprintln!("Error: {err}");
                return;
            }
        }
    }

    if show_moon {
        out.push_str(&format!("The Moon is {}.\n", lunar::describe(Some(ts))));
    }

    print!("{}", text::wrap(&out, width));
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
