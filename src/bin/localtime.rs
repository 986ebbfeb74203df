//! Display a date/time converted to local time
//!
//! Useful for testing the date/time parser, and for converting UTC
//! times (`Z` suffix) to local time.
//!
//! Usage:
//!   localtime [-f] [[YYYY-MM-DD][T]HH:MM[:SS][Z]]

use clap::Parser;

use almanac::{text, Timestamp};

/// Display the local time
#[derive(Parser, Debug)]
#[command(version, about = "Display the local time", long_about = None)]
struct Args {
    /// Display the full date/time in the canonic ISO 8601 format
    #[arg(short, long)]
    full: bool,

    /// Print parser diagnostics to stderr
    #[arg(short, long)]
    debug: bool,

    /// Date/time to convert: [YYYY-MM-DD][T]HH:MM[:SS][Z] or YYYY-DDD;
    /// default: now
    datetime: Option<String>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    let ts = match &args.datetime {
        Some(text) => match Timestamp::parse(text) {
            Ok(ts) => ts,
            Err(err) => {
                eprintln!("Error: Invalid argument: '{text}': {err}");
                std::process::exit(1);
            }
        },
        None => Timestamp::now(),
    };

    if args.full {
        print!("{} ", ts.format_date());
    }
    println!(
        "{}",
        text::time_text(ts.hour.unwrap_or(0), ts.minute.unwrap_or(0), ts.second, None)
    );
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
