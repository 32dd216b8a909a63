use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod error;
mod export;
mod format;
mod info;
mod order;
mod timetable;
mod utils;

use format::Format;
use timetable::models::Activity;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    /// The timetable export to read, i.e.: Sem1_All_StudentSets.htm
    #[clap(value_parser)]
    input: PathBuf,

    /// Where to write the semicolon separated activities
    #[clap(value_parser)]
    output: PathBuf,

    /// TOML profile describing the export format, default to the stock one
    #[clap(short, long, value_name = "FILE")]
    format: Option<PathBuf>,

    /// Print the extracted timetable once written
    #[clap(short, long)]
    preview: bool,

    /// Verbosity level (-v, -vv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let format = match &args.format {
        Some(path) => Format::load(path)
            .with_context(|| format!("loading format profile {}", path.display()))?,
        None => Format::default(),
    };

    let activities = run(&args.input, &args.output, &format).with_context(|| {
        format!(
            "converting {} to {}",
            args.input.display(),
            args.output.display()
        )
    })?;

    if args.preview {
        timetable::display(&activities, &format)?;
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "gridtab=info",
        1 => "gridtab=debug",
        _ => "gridtab=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Read the export, extract and order its activities, then write them.
///
/// Nothing is written before the whole document has been decoded.
fn run(input: &Path, output: &Path, format: &Format) -> error::Result<Vec<Activity>> {
    let document = utils::load_document(input, format.encoding()?)?;
    let activities = order::index(timetable::timetable(&document, format)?);

    export::export(&activities, output)?;

    let last = activities.iter().map(|a| a.timeslot).fold(0.0, f64::max);
    tracing::info!(
        activities = activities.len(),
        max_timeslot = last,
        output = %output.display(),
        "export complete"
    );

    Ok(activities)
}
