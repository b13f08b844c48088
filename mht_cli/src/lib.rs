//! Command-line front end for the MHT tracker.
//!
//! Wires the CSV wire format and the parameter file onto
//! [`mht_core::MhtEngine`]. The binary lives in `main.rs`; everything
//! testable lives here.

pub mod error;
pub mod io;
pub mod params_file;

use std::path::Path;

use mht_core::{MhtEngine, Track};
use tracing::info;

pub use error::CliError;

/// End-to-end run: validate paths, read parameters and detections, track,
/// write the output CSV.
pub fn run_tracker(
    input: &Path,
    output: &Path,
    params_path: &Path,
    max_frames: Option<usize>,
) -> Result<Vec<Track>, CliError> {
    io::validate_args(input, output, params_path)?;

    let params = params_file::read_params(params_path)?;
    params.validate().map_err(CliError::Tracker)?;
    info!("MHT parameters: {params:?}");

    let frames = io::read_detections_csv(input, max_frames)?;
    let dims = frames
        .iter()
        .flat_map(|frame| frame.iter())
        .next()
        .map_or(2, |detection| detection.len());

    let engine = MhtEngine::new(frames, params)?;
    let tracks = engine.run()?;
    io::write_tracks_csv(output, &tracks, dims)?;
    Ok(tracks)
}
