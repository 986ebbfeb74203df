//! Print the phase of the moon
//!
//! Usage:
//!   potm                  one-line phase description
//!   potm --art            adds an ASCII-art picture sized to the terminal
//!   potm --art 20x40      picture with explicit dimensions

use clap::Parser;

use almanac::{lunar, Timestamp};

/// Print the phase of the moon
#[derive(Parser, Debug)]
#[command(version, about = "Print the phase of the moon", long_about = None)]
struct Args {
    /// Render an ASCII-art picture of the moon, optionally sized ROWSxCOLS
    #[arg(short, long, value_name = "ROWSxCOLS", num_args = 0..=1, default_missing_value = "auto")]
    art: Option<String>,

    /// Swap light and dark in the picture, for light terminal backgrounds
    #[arg(short, long)]
    inverse: bool,

    /// Print diagnostics to stderr
    #[arg(short, long)]
    debug: bool,

    /// Date/time to describe; default: now
    datetime: Option<String>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    let ts = match &args.datetime {
        Some(text) => match Timestamp::parse(text) {
            Ok(ts) => Some(ts),
            Err(err) => {
                eprintln!("Error: Invalid argument: '{text}': {err}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let phase = lunar::describe(ts.as_ref());
    println!("Phase-of-the-Moon: {phase}");

    let size = match args.art.as_deref() {
        None => None,
        Some("auto") => Some(terminal_art_size()),
        Some(spec) => match parse_art_size(spec) {
            Some(size) => Some(size),
            None => {
                eprintln!("Error: Invalid art size: '{spec}' (expected ROWSxCOLS)");
                std::process::exit(1);
            }
        },
    };
    if let Some((rows, cols)) = size {
        match lunar::render(rows, cols, args.inverse, ts.as_ref()) {
            Ok(art) => print!("{art}"),
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    }
}

fn parse_art_size(spec: &str) -> Option<(usize, usize)> {
    let (rows, cols) = spec.split_once(['x', 'X'])?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

/// Pick a picture size from the terminal dimensions, keeping the disc
/// roughly round on a 1:2 character cell
fn terminal_art_size() -> (usize, usize) {
    term_size::dimensions()
        .map(|(w, h)| {
            let rows = h.saturating_sub(3).max(4);
            let cols = (2 * rows).min(w.saturating_sub(1).max(8));
            (rows, cols)
        })
        .unwrap_or((12, 24))
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
