//! MHT tracker CLI
//!
//! Reads point detections from a CSV file, runs multiple hypothesis
//! tracking, and writes the solution tracks to a CSV file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use mht_cli::run_tracker;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Multiple hypothesis tracking for 2D and 3D point detections
#[derive(Parser, Debug)]
#[command(name = "mht", version, about, long_about = None)]
struct Args {
    /// Input CSV file path (frame,u,v[,w])
    ifile: PathBuf,

    /// Output CSV file path (frame,track,u,v[,w])
    ofile: PathBuf,

    /// Path to the parameter text file (key=value lines)
    pfile: PathBuf,

    /// Cap on the number of frames ingested from the input CSV
    #[arg(long)]
    max_frames: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Input file is: {}", args.ifile.display());
    info!("Output file is: {}", args.ofile.display());
    info!("Parameter file is: {}", args.pfile.display());

    let start = Instant::now();
    match run_tracker(&args.ifile, &args.ofile, &args.pfile, args.max_frames) {
        Ok(tracks) => {
            info!("Generated {} solution tracks.", tracks.len());
            info!("Elapsed time (seconds): {:.3}", start.elapsed().as_secs_f64());
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}
